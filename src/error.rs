//! Error types

use std::io;
use thiserror::Error;

/// Malformed scenario content, detected before any synthesis starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("invalid symbol '{symbol}' at position {position} for {width}-bit decoding")]
    InvalidSymbol {
        symbol: char,
        position: usize,
        width: u32,
    },

    #[error("unsupported symbol width: {0} (expected 3 or 4)")]
    UnsupportedWidth(u32),

    #[error("empty symbol string")]
    Empty,

    #[error("unknown satellite type: {0}")]
    UnknownSatelliteType(String),
}

/// Inconsistent signal parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("macro step of {macro_step} s is not a whole number of samples at {sample_rate} Hz")]
    FractionalWindow { macro_step: f64, sample_rate: f64 },

    #[error("window length is zero")]
    EmptyWindow,

    #[error("ranging code period must be 1 ms, got {0} ms")]
    CodePeriod(f64),

    #[error("NH code has {actual} bits, expected {expected}")]
    NhLength { expected: usize, actual: usize },

    #[error("invalid NH code: {0}")]
    NhCode(#[from] DecodeError),

    #[error(
        "channel {channel}: delay reading {step} is {delay} s, outside (0, {guard_offset}) s"
    )]
    DelayOutOfRange {
        channel: usize,
        step: usize,
        delay: f64,
        guard_offset: f64,
    },
}

/// Failure while loading a scenario file.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("satellite {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("satellite {index}: {delay} delay samples but {elevation} elevation samples")]
    SeriesMismatch {
        index: usize,
        delay: usize,
        elevation: usize,
    },

    #[error("satellite {index}: delay reading {step} is {delay} s, expected a positive value")]
    InvalidDelay { index: usize, step: usize, delay: f64 },

    #[error("satellite {index}: empty {field} series")]
    EmptySeries { index: usize, field: &'static str },

    #[error("scenario contains no satellites")]
    NoSatellites,
}

/// Top-level error for a simulation run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("output error: {0}")]
    Output(#[from] io::Error),

    #[error("writer thread terminated unexpectedly")]
    WriterGone,
}
