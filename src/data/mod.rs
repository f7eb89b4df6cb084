//! Datasets
//!
//! - [`Dataset`] - feature matrix plus label vector
//! - [`synthetic`] - seeded generators for regression and classification problems

mod dataset;
pub mod synthetic;

pub use dataset::Dataset;
pub use synthetic::{make_blobs, make_polynomial};
