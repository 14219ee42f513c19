//! Integration tests for the likelihood scan workflow
//!
//! Tests are organized by topic:
//! - `round_trip` - Saving and reloading populated and partial scans
//! - `workflow` - Registering likelihoods and sweeping full grids
