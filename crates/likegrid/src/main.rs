use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use likegrid::{ScanConfig, ScanSummary, init_logging, run_scan};
use likegrid_core::{LikelihoodResults, contour_levels};

#[derive(Parser, Debug)]
#[command(name = "likegrid")]
#[command(about = "Compute, store and inspect two-parameter likelihood scans")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the scan described by a YAML config and save the grid
    Scan {
        /// Path to the scan config
        #[arg(short, long)]
        config: PathBuf,

        /// Where to write the likelihood grid
        #[arg(short, long)]
        output: PathBuf,

        /// Evaluate grid cells on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Summarise a stored likelihood grid
    Info {
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print Δχ² contour levels for the given numbers of standard deviations
    Levels {
        #[arg(short, long = "sigma", default_values_t = [1.0, 2.0])]
        sigmas: Vec<f64>,

        /// Degrees of freedom
        #[arg(short, long, default_value_t = 2)]
        dof: usize,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Scan {
            config,
            output,
            parallel,
        } => {
            let scan = ScanConfig::load(&config)?;
            let results = run_scan(&scan, &output, parallel)?;
            print!("{}", ScanSummary::from(&results));
        }
        Command::Info { path, json } => {
            let results = LikelihoodResults::load(&path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?;
            let summary = ScanSummary::from(&results);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
        }
        Command::Levels { sigmas, dof } => {
            for (n, level) in sigmas.iter().zip(contour_levels(&sigmas, dof)?) {
                println!("{n} sigma: {level:.4}");
            }
        }
    }

    Ok(())
}
