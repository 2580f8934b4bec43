pub mod output;

pub use output::{IqSink, SampleFormat, pack_iq8, pack_iq16};
