pub mod domain;
pub mod store;

pub use domain::{EnergyReading, NewEnergyReading};
pub use store::{ReadingStore, StorageError, DEFAULT_LIST_LIMIT};
