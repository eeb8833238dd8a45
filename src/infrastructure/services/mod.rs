//! Infrastructure services

mod batch_loader;

pub use batch_loader::{BatchLoader, LoadReport, LoaderConfig, SeedReport};
