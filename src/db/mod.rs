pub mod accumulation;
pub mod catalog;

pub use accumulation::{AccumulationStore, Snapshot};
pub use catalog::Catalog;
