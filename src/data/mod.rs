pub mod dataset;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dataset::{Dataset, DatasetFile};
pub use storage::load_dataset;
pub use types::*;
