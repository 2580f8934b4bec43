/// Log level (overridden by RUST_LOG)
pub const LOG_LEVEL: &str = "info";

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "b1i.bin";

// ============================================================================
// Physical constants
// ============================================================================

/// Speed of light (m/s)
pub const LIGHT_SPEED: f64 = 299_792_458.0;

// ============================================================================
// B1I signal parameters
// ============================================================================

/// Nominal carrier frequency (Hz)
pub const B1I_CARRIER_FREQ: f64 = 1561.098e6;

/// Ranging code rate (chip/s)
pub const B1I_CODE_RATE: f64 = 2.046e6;

/// Chips per ranging code period (1 ms)
pub const B1I_CODE_LENGTH: usize = 2046;

/// Navigation data bit length in code periods (50 bps)
pub const MS_PER_DATA_BIT: usize = 20;

/// NH secondary code 0000 0100 1101 0100 1110, one bit per code period
pub const NH_CODE: &str = "04d4e";

// ============================================================================
// Simulation parameters
// ============================================================================

/// Default sampling rate (Hz)
pub const DEFAULT_SAMPLE_RATE: f64 = 5e6;

/// Macro-update period (s), also the cadence of the scenario time series
pub const MACRO_STEP: f64 = 0.1;

/// Added to the transmit time offset so it stays positive (s).
/// Must exceed the largest expected propagation delay.
pub const GUARD_OFFSET: f64 = 0.2;

/// Range at which path loss is unity (m), BDS MEO orbit altitude
pub const PATH_LOSS_REF: f64 = 21_528_000.0;

/// Gain multiplier applied on top of path loss and antenna pattern
pub const GAIN_SCALE: f64 = 128.0;

/// Right shift normalizing the channel sum to 16-bit samples
pub const OUTPUT_SHIFT: u32 = 7;

/// Right shift narrowing a 16-bit sample to 8 bits
pub const IQ8_SHIFT: u32 = 4;

/// Carrier table amplitude
pub const CARRIER_TABLE_AMPLITUDE: f64 = 250.0;

/// Blocks buffered between the synthesis loop and the writer thread
pub const WRITER_QUEUE_DEPTH: usize = 4;
