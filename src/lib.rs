//! BeiDou B1I baseband IQ synthesizer.
//!
//! Builds one NCO channel per satellite from a scenario description and sums
//! the channels into an interleaved IQ sample stream.

pub mod error;
pub mod io;
pub mod scenario;
pub mod signal;
pub mod sim;
pub mod ui;
pub mod utils;

pub use error::SimError;
pub use scenario::{SatType, SatelliteRecord, Scenario};
pub use signal::{
    BitSequence, ChannelSimulator, IqSample, LookupTables, SampleSeries,
    SignalCompositor, SignalConfig,
};
pub use sim::{RunSummary, Simulation};
