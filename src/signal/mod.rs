// Signal generation core: bit sequences, per-satellite NCO channels and
// the multi-channel compositor

pub mod bits;
pub mod carrier;
pub mod channel;
pub mod compositor;
pub mod config;
pub mod series;
pub mod tables;

pub use bits::BitSequence;
pub use channel::{ChannelSimulator, ChannelState};
pub use compositor::{IqSample, SignalCompositor, narrow_to_iq8};
pub use config::SignalConfig;
pub use series::SampleSeries;
pub use tables::LookupTables;
