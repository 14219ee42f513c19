//! Saving and loading likelihood scans
//!
//! Layout inside the container:
//!
//! ```text
//! /axes                 attrs: "x name", "x tex", "y name", "y tex"
//!     x                 f32[x.len()]
//!     y                 f32[y.len()]
//! /likelihoods
//!     <likelihood id>   attrs: "tex", "order"
//!         values        f32[x.len(), y.len()]
//! ```
//!
//! Tick and grid values are narrowed to f32 on save.

mod container;

pub use container::{
    Attribute, Dataset, FORMAT_VERSION, Group, MAGIC, read_container, write_container,
};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::axis::Axis;
use crate::error::StorageResult;
use crate::results::LikelihoodResults;
use crate::values::LikelihoodValues;

const AXES: &str = "axes";
const LIKELIHOODS: &str = "likelihoods";
const VALUES: &str = "values";

fn load_axis(axes: &Group, key: &str) -> StorageResult<Axis> {
    let ticks = axes.dataset(key)?.to_array1(key)?;
    let name = axes.attr_str(&format!("{key} name"))?;
    let tex = axes.attr_str(&format!("{key} tex"))?;
    Ok(Axis::new(ticks.to_vec(), name, tex)?)
}

/// `scan.lhg` -> `scan.lhg.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl LikelihoodResults {
    /// Build the container tree for these results
    pub fn to_group(&self) -> Group {
        let mut root = Group::root();

        let axes = root.create_group(AXES);
        axes.create_dataset("x", Dataset::from_slice(self.x().ticks()));
        axes.create_dataset("y", Dataset::from_slice(self.y().ticks()));
        axes.set_attr("x name", self.x().name());
        axes.set_attr("x tex", self.x().tex_label());
        axes.set_attr("y name", self.y().name());
        axes.set_attr("y tex", self.y().tex_label());

        let likelihoods = root.create_group(LIKELIHOODS);
        for lh in self.likelihoods() {
            let group = likelihoods.create_group(lh.likelihood());
            group.set_attr("tex", lh.tex_label());
            group.set_attr("order", lh.order());
            group.create_dataset(VALUES, Dataset::from_array2(lh.data()));
        }

        root
    }

    /// Rebuild results from a container tree.
    ///
    /// Likelihoods are sorted by their ordering key, since the container
    /// keeps groups in key order.
    pub fn from_group(root: &Group) -> StorageResult<Self> {
        let axes = root.group(AXES)?;
        let x = load_axis(axes, "x")?;
        let y = load_axis(axes, "y")?;
        let mut results = LikelihoodResults::new(x, y);

        let likelihoods = root.group(LIKELIHOODS)?;
        for (id, group) in &likelihoods.groups {
            let data = group.dataset(VALUES)?.to_array2(VALUES)?;
            let lh = LikelihoodValues::new(data, id.as_str(), group.attr_str("tex")?)
                .with_order(group.attr_int("order")?);
            results.add_likelihood(lh)?;
        }
        results.sort_by_order();

        Ok(results)
    }

    /// Serialize to `writer`
    pub fn to_storage<W: Write>(&self, writer: W) -> StorageResult<()> {
        write_container(&self.to_group(), writer)
    }

    /// Deserialize from `reader`
    pub fn from_storage<R: Read>(reader: R) -> StorageResult<Self> {
        Self::from_group(&read_container(reader)?)
    }

    /// Save to a file.
    ///
    /// The data is written to a sibling temporary file which is then renamed
    /// over `path`, so an interrupted save never leaves a truncated file.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let tmp = temp_path(path);
        let result: StorageResult<()> = File::create(&tmp)
            .map_err(Into::into)
            .and_then(|file| self.to_storage(BufWriter::new(file)));
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load from a file written by [`LikelihoodResults::save`]
    pub fn load(path: &Path) -> StorageResult<Self> {
        let file = File::open(path)?;
        Self::from_storage(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GridError, StorageError};
    use crate::function::LikelihoodPoint;

    fn populated() -> LikelihoodResults {
        let x = Axis::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], "x", "x").unwrap();
        let y = Axis::new(vec![6.0, 7.0, 8.0, 9.0, 10.0], "y", "y").unwrap();
        let mut lhr = LikelihoodResults::new(x, y);
        lhr.new_likelihood("testnew", "testnew").unwrap();
        lhr.calculate_all(&mut |x: f64, y: f64| LikelihoodPoint::from([("testnew", x * y)]))
            .unwrap();
        lhr
    }

    #[test]
    fn test_save_to_buffer() {
        let mut buffer = Vec::new();
        populated().to_storage(&mut buffer).unwrap();
        assert!(buffer.starts_with(MAGIC));
    }

    #[test]
    fn test_load_from_buffer() {
        let mut buffer = Vec::new();
        populated().to_storage(&mut buffer).unwrap();

        let lh2 = LikelihoodResults::from_storage(buffer.as_slice()).unwrap();
        assert_eq!(lh2.likelihoods()[0].get(2, 3), Some(24.0));
        assert_eq!(lh2.x().name(), "x");
        assert_eq!(lh2.y().ticks(), &[6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_group_layout() {
        let root = populated().to_group();
        let axes = root.group("axes").unwrap();
        assert_eq!(axes.attr_str("x name").unwrap(), "x");
        assert_eq!(axes.attr_str("y tex").unwrap(), "y");
        let values = root
            .group("likelihoods")
            .unwrap()
            .group("testnew")
            .unwrap()
            .dataset("values")
            .unwrap();
        assert_eq!(values.shape, vec![5, 5]);
    }

    #[test]
    fn test_missing_likelihoods_group() {
        let mut root = populated().to_group();
        root.groups.remove("likelihoods");
        let err = LikelihoodResults::from_group(&root).unwrap_err();
        assert!(matches!(err, StorageError::MissingGroup { path } if path == "/likelihoods"));
    }

    #[test]
    fn test_missing_order_attribute() {
        let mut root = populated().to_group();
        root.groups
            .get_mut("likelihoods")
            .and_then(|g| g.groups.get_mut("testnew"))
            .unwrap()
            .attrs
            .remove("order");
        let mut buffer = Vec::new();
        write_container(&root, &mut buffer).unwrap();

        let err = LikelihoodResults::from_storage(buffer.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::MissingAttribute { group, name }
                if group == "/likelihoods/testnew" && name == "order"
        ));
    }

    #[test]
    fn test_stored_shape_mismatch() {
        let mut root = populated().to_group();
        root.groups
            .get_mut("likelihoods")
            .and_then(|g| g.groups.get_mut("testnew"))
            .unwrap()
            .create_dataset("values", Dataset {
                shape: vec![4, 5],
                data: vec![0.0; 20],
            });
        let err = LikelihoodResults::from_group(&root).unwrap_err();
        assert!(matches!(err, StorageError::Grid(GridError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_stored_shape_overflow() {
        let mut root = populated().to_group();
        root.groups
            .get_mut("likelihoods")
            .and_then(|g| g.groups.get_mut("testnew"))
            .unwrap()
            .create_dataset("values", Dataset {
                shape: vec![usize::MAX, 3],
                data: vec![],
            });
        let mut buffer = Vec::new();
        write_container(&root, &mut buffer).unwrap();

        let err = LikelihoodResults::from_storage(buffer.as_slice()).unwrap_err();
        assert!(matches!(err, StorageError::DatasetShape { name, .. } if name == "values"));
    }

    #[test]
    fn test_temp_path_keeps_extension() {
        assert_eq!(temp_path(Path::new("out/scan.lhg")), Path::new("out/scan.lhg.tmp"));
        assert_ne!(temp_path(Path::new("scan.lhg")), temp_path(Path::new("scan.h5")));
    }

    #[test]
    fn test_save_leaves_unrelated_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let unrelated = dir.path().join("scan.tmp");
        fs::write(&unrelated, "keep me").unwrap();

        populated().save(&dir.path().join("scan.lhg")).unwrap();
        assert_eq!(fs::read_to_string(&unrelated).unwrap(), "keep me");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.lhg");

        let lhr = populated();
        lhr.save(&path).unwrap();
        assert!(!dir.path().join("scan.lhg.tmp").exists());

        let loaded = LikelihoodResults::load(&path).unwrap();
        assert_eq!(loaded, lhr);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LikelihoodResults::load(&dir.path().join("absent.lhg")).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
