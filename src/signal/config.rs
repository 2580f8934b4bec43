use crate::error::ConfigError;
use crate::signal::bits::BitSequence;
use crate::utils::consts::*;

#[derive(Clone, Debug)]
pub struct SignalConfig {
    pub sample_rate: f64,       // output sampling frequency [Hz]
    pub carrier_freq: f64,      // nominal carrier [Hz]
    pub code_rate: f64,         // nominal ranging code rate [chip/s]
    pub code_length: usize,     // chips per ranging code period
    pub macro_step: f64,        // macro-update period T [s]
    pub guard_offset: f64,      // keeps the transmit time offset positive [s]
    pub ms_per_data_bit: usize, // code periods per navigation bit
    pub nh_code: String,        // secondary code, hex
    pub path_loss_ref: f64,     // reference range for unit path loss [m]
    pub gain_scale: f64,
    pub output_shift: u32,      // accumulator normalization shift

    // computed values
    pub sample_interval: f64,   // 1/fs
    pub window_length: usize,   // samples per macro step
    pub chips_per_ms: f64,
    pub code_period: f64,       // [s]
}

impl SignalConfig {
    pub fn new(
        sample_rate: f64,
        carrier_freq: f64,
        code_rate: f64,
        code_length: usize,
        macro_step: f64,
    ) -> Result<Self, ConfigError> {
        let sample_interval = 1.0 / sample_rate;

        let window = macro_step * sample_rate;
        let window_length = window.round() as usize;
        if (window - window_length as f64).abs() > 1e-6 {
            return Err(ConfigError::FractionalWindow {
                macro_step,
                sample_rate,
            });
        }
        if window_length == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        let code_period = code_length as f64 / code_rate;
        let period_ms = code_period * 1e3;
        if (period_ms - 1.0).abs() > 1e-9 {
            return Err(ConfigError::CodePeriod(period_ms));
        }

        let config = Self {
            sample_rate,
            carrier_freq,
            code_rate,
            code_length,
            macro_step,
            guard_offset: GUARD_OFFSET,
            ms_per_data_bit: MS_PER_DATA_BIT,
            nh_code: NH_CODE.to_string(),
            path_loss_ref: PATH_LOSS_REF,
            gain_scale: GAIN_SCALE,
            output_shift: OUTPUT_SHIFT,
            sample_interval,
            window_length,
            chips_per_ms: code_rate / 1e3,
            code_period,
        };
        config.nh_sequence()?;
        Ok(config)
    }

    /// BeiDou B1I signal at the given sampling rate.
    pub fn b1i(sample_rate: f64) -> Result<Self, ConfigError> {
        Self::new(
            sample_rate,
            B1I_CARRIER_FREQ,
            B1I_CODE_RATE,
            B1I_CODE_LENGTH,
            MACRO_STEP,
        )
    }

    /// Decoded NH code; its length must match the code periods per data bit.
    pub fn nh_sequence(&self) -> Result<BitSequence, ConfigError> {
        let nh = BitSequence::from_hex(&self.nh_code)?;
        if nh.len() != self.ms_per_data_bit {
            return Err(ConfigError::NhLength {
                expected: self.ms_per_data_bit,
                actual: nh.len(),
            });
        }
        Ok(nh)
    }

    /// Fraction of a code period covered by one sample.
    pub fn carrier_cycle_units(&self) -> f64 {
        self.sample_interval / self.code_period
    }

    pub fn samples_for(&self, duration: f64) -> usize {
        (duration * self.sample_rate).round() as usize
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::b1i(DEFAULT_SAMPLE_RATE).expect("built-in B1I configuration is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b1i_computed_values() {
        let config = SignalConfig::b1i(5e6).unwrap();
        assert_eq!(config.window_length, 500_000);
        assert_eq!(config.chips_per_ms, 2046.0);
        assert!((config.code_period - 1e-3).abs() < 1e-15);
        assert_eq!(config.nh_sequence().unwrap().len(), 20);
    }

    #[test]
    fn test_fractional_window_is_rejected() {
        let err = SignalConfig::b1i(3.33).unwrap_err();
        assert!(matches!(err, ConfigError::FractionalWindow { .. }));
    }

    #[test]
    fn test_code_period_must_be_one_millisecond() {
        let err = SignalConfig::new(8000.0, B1I_CARRIER_FREQ, 8000.0, 16, 0.1)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CodePeriod(_)));
    }

    #[test]
    fn test_nh_length_mismatch() {
        let mut config = SignalConfig::b1i(2.046e6).unwrap();
        config.nh_code = "ff".to_string();
        assert_eq!(
            config.nh_sequence().unwrap_err(),
            ConfigError::NhLength {
                expected: 20,
                actual: 8
            }
        );
    }
}
