//! Scenario input: per-satellite records and their JSON loader
pub mod loader;
pub mod record;

pub use loader::Scenario;
pub use record::{Bds2Satellite, RecordExtension, SatType, SatelliteRecord};
