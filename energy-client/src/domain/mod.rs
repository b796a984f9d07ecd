pub mod energy_reading;

pub use energy_reading::{EnergyReading, NewEnergyReading};
