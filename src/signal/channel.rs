use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::scenario::SatelliteRecord;
use crate::signal::bits::{BitSequence, bit_to_sign};
use crate::signal::carrier::{
    carrier_doppler, carrier_phase_cycles, cycles_to_accumulator,
    cycles_to_step,
};
use crate::signal::config::SignalConfig;
use crate::signal::series::SampleSeries;
use crate::signal::tables::LookupTables;
use crate::utils::consts::LIGHT_SPEED;

/// Per-satellite oscillator state.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelState {
    /// 32-bit carrier phase accumulator, one cycle per 2^32
    pub carrier_phase: u32,
    /// Accumulator increment applied at each code period boundary
    pub carrier_phase_step: i32,
    /// Chips, always in [0, code_length)
    pub code_phase: f64,
    /// Chips advanced per output sample
    pub code_phase_step: f64,
    pub carrier_freq: f64,
    pub code_freq: f64,
    pub gain: i32,
    pub prev_delay: f64,
    pub ref_delay: f64,
    /// Samples produced since the last macro-update
    pub iter_index: usize,
}

/// One satellite's signal generator.
///
/// Every `window_length` samples it reads the next delay and elevation
/// readings and recomputes Doppler, code timing and gain (a macro-update).
/// Between updates it runs as a pair of NCOs: code phase advances every
/// sample, carrier phase once per ranging code period.
#[derive(Clone, Debug)]
pub struct ChannelSimulator {
    id: usize,
    state: ChannelState,
    nav_data: BitSequence,
    ranging_code: BitSequence,
    nh_code: BitSequence,
    delay: SampleSeries,
    elevation: SampleSeries,
    config: SignalConfig,
    tables: &'static LookupTables,
    updates: usize,
    clamp_reported: bool,
}

impl ChannelSimulator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        nav_data: BitSequence,
        ranging_code: BitSequence,
        delay: SampleSeries,
        elevation: SampleSeries,
        ref_delay: f64,
        config: &SignalConfig,
        tables: &'static LookupTables,
    ) -> Result<Self, ConfigError> {
        let nh_code = config.nh_sequence()?;

        // the transmit time offset and the path loss both need 0 < delay < guard
        for step in 0..delay.len() {
            let d = delay.at(step);
            if !(d > 0.0 && d < config.guard_offset) {
                return Err(ConfigError::DelayOutOfRange {
                    channel: id,
                    step,
                    delay: d,
                    guard_offset: config.guard_offset,
                });
            }
        }

        let r0 = delay.current();
        let init_cycles =
            carrier_phase_cycles(2.0 * ref_delay - r0, config.carrier_freq);

        let state = ChannelState {
            carrier_phase: cycles_to_accumulator(init_cycles),
            carrier_phase_step: 0,
            code_phase: 0.0,
            code_phase_step: config.code_rate / config.sample_rate,
            carrier_freq: 0.0,
            code_freq: config.code_rate,
            gain: 0,
            prev_delay: r0,
            ref_delay,
            // first sample triggers the initial macro-update
            iter_index: config.window_length,
        };

        Ok(Self {
            id,
            state,
            nav_data,
            ranging_code,
            nh_code,
            delay,
            elevation,
            config: config.clone(),
            tables,
            updates: 0,
            clamp_reported: false,
        })
    }

    pub fn from_record(
        id: usize,
        record: &dyn SatelliteRecord,
        config: &SignalConfig,
        tables: &'static LookupTables,
    ) -> Result<Self, ConfigError> {
        Self::new(
            id,
            record.data().clone(),
            record.ranging_code().clone(),
            SampleSeries::new(record.delay_series().to_vec()),
            SampleSeries::new(record.elevation_series().to_vec()),
            record.ref_delay(),
            config,
            tables,
        )
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Position within the NH code, in [0, nh length)
    pub fn nh_bit_index(&self) -> usize {
        self.nh_code.cursor()
    }

    pub fn data_bit_index(&self) -> usize {
        self.nav_data.cursor()
    }

    /// Number of macro-updates performed so far
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn code_length(&self) -> usize {
        self.config.code_length
    }

    /// Recompute frequencies, code timing and gain from the next delay and
    /// elevation readings.
    fn macro_update(&mut self) {
        let cfg = &self.config;
        let rho = self.delay.current();
        let elevation = self.elevation.current();
        let elapsed = self.updates as f64 * cfg.macro_step;

        // Doppler from the range rate over one macro step
        let carrier_freq = carrier_doppler(
            rho,
            self.state.prev_delay,
            cfg.carrier_freq,
            cfg.macro_step,
        );
        let code_freq =
            cfg.code_rate + carrier_freq * (cfg.code_rate / cfg.carrier_freq);

        // Transmit time offset, split into whole code periods and chips
        let tau_ms = (elapsed + cfg.guard_offset - rho) * 1e3;
        let whole_ms = tau_ms.floor();
        assert!(
            whole_ms >= 0.0,
            "channel {}: delay {} s exceeds guard offset at t={} s",
            self.id,
            rho,
            elapsed
        );
        let ims = whole_ms as usize;
        let mut code_phase = (tau_ms - whole_ms) * cfg.chips_per_ms;
        if code_phase >= cfg.code_length as f64 {
            code_phase -= cfg.code_length as f64;
        }

        self.nav_data.seek(ims / cfg.ms_per_data_bit);
        self.nh_code.seek(ims % cfg.ms_per_data_bit);

        // Carrier phase advance over one code period
        let step_cycles =
            carrier_freq * cfg.sample_interval / cfg.carrier_cycle_units();

        let path_loss = cfg.path_loss_ref / (rho * LIGHT_SPEED);
        let (bucket, clamped) = self.tables.antenna_index(elevation);
        if clamped && !self.clamp_reported {
            warn!(
                "Channel {}: elevation {:.2} deg outside antenna pattern, clamped",
                self.id, elevation
            );
            self.clamp_reported = true;
        }
        let gain =
            (self.tables.antenna[bucket] * path_loss * cfg.gain_scale).round() as i32;

        self.state.carrier_freq = carrier_freq;
        self.state.code_freq = code_freq;
        self.state.code_phase = code_phase;
        self.state.code_phase_step = code_freq / cfg.sample_rate;
        self.state.carrier_phase_step = cycles_to_step(step_cycles);
        self.state.gain = gain;
        self.state.prev_delay = rho;
        self.state.iter_index = 0;

        self.delay.advance();
        self.elevation.advance();
        self.updates += 1;

        debug!(
            "Channel {} update {}: doppler={:.3} Hz code={:.3} chip/s gain={} \
             data_bit={} nh_bit={}",
            self.id,
            self.updates,
            carrier_freq,
            code_freq,
            gain,
            self.nav_data.cursor(),
            self.nh_code.cursor()
        );
    }

    /// Produce this channel's next (I, Q) contribution.
    pub fn produce_next_iq(&mut self) -> (i32, i32) {
        if self.state.iter_index == self.config.window_length {
            self.macro_update();
        }

        let idx = LookupTables::carrier_index(self.state.carrier_phase);
        let chip = self.state.code_phase as usize;
        let sign = bit_to_sign(self.nav_data.current_bit())
            * bit_to_sign(self.ranging_code.bit_at(chip))
            * bit_to_sign(self.nh_code.current_bit());
        let amplitude = sign * self.state.gain;
        let i = amplitude * self.tables.cos[idx];
        let q = amplitude * self.tables.sin[idx];

        self.state.code_phase += self.state.code_phase_step;
        let code_length = self.config.code_length as f64;
        if self.state.code_phase >= code_length {
            self.state.code_phase -= code_length;
            if self.nh_code.advance() {
                self.nav_data.advance();
            }
            self.state.carrier_phase = self
                .state
                .carrier_phase
                .wrapping_add_signed(self.state.carrier_phase_step);
        }
        debug_assert!((0.0..code_length).contains(&self.state.code_phase));

        self.state.iter_index += 1;
        (i, q)
    }

    /// Render `len` consecutive contributions.
    pub fn render(&mut self, len: usize) -> Vec<(i32, i32)> {
        (0..len)
            .map(|_| self.produce_next_iq())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::consts::B1I_CARRIER_FREQ;

    // 1 ms code of 8 chips sampled once per chip, 10 ms macro step
    fn small_config() -> SignalConfig {
        SignalConfig::new(8000.0, B1I_CARRIER_FREQ, 8000.0, 8, 0.01).unwrap()
    }

    fn try_channel(
        config: &SignalConfig,
        delays: Vec<f64>,
        elevations: Vec<f64>,
    ) -> Result<ChannelSimulator, ConfigError> {
        ChannelSimulator::new(
            0,
            BitSequence::from_hex("a5f0").unwrap(),
            BitSequence::from_octal("3641").unwrap(),
            SampleSeries::new(delays),
            SampleSeries::new(elevations),
            0.07,
            config,
            LookupTables::shared(),
        )
    }

    fn channel(
        config: &SignalConfig,
        delays: Vec<f64>,
        elevations: Vec<f64>,
    ) -> ChannelSimulator {
        try_channel(config, delays, elevations).unwrap()
    }

    #[test]
    fn test_initial_carrier_phase_from_reference_delay() {
        let config = small_config();
        let ch = channel(&config, vec![0.071], vec![45.0]);
        let expected = cycles_to_accumulator(carrier_phase_cycles(
            2.0 * 0.07 - 0.071,
            B1I_CARRIER_FREQ,
        ));
        assert_eq!(ch.state().carrier_phase, expected);
        assert_eq!(ch.state().prev_delay, 0.071);
    }

    #[test]
    fn test_window_length_between_updates() {
        let config = small_config();
        let mut ch = channel(&config, vec![0.07, 0.07000001, 0.07000002], vec![30.0]);
        let window = config.window_length;
        assert_eq!(window, 80);

        ch.produce_next_iq();
        assert_eq!(ch.updates(), 1);
        for n in 1..window * 4 {
            let before = ch.updates();
            ch.produce_next_iq();
            let fired = ch.updates() != before;
            assert_eq!(fired, n % window == 0, "sample {}", n);
            if fired {
                assert_eq!(ch.state().iter_index, 1);
            }
        }
    }

    #[test]
    fn test_phase_and_nh_invariants_hold() {
        let config = small_config();
        let delays: Vec<f64> = (0..10).map(|k| 0.07 + k as f64 * 3e-8).collect();
        let mut ch = channel(&config, delays, vec![60.0]);
        for _ in 0..config.window_length * 25 {
            ch.produce_next_iq();
            let phase = ch.state().code_phase;
            assert!(phase >= 0.0 && phase < 8.0, "code phase {}", phase);
            assert!(ch.nh_bit_index() < 20);
        }
    }

    #[test]
    fn test_doppler_from_consecutive_delays() {
        let config = small_config();
        let (r0, r1) = (0.0712, 0.0712 + 2.5e-8);
        let mut ch = channel(&config, vec![r0, r1], vec![50.0]);

        ch.produce_next_iq();
        assert_eq!(ch.state().carrier_freq, 0.0);

        ch.render(config.window_length);
        assert_eq!(ch.updates(), 2);
        let lambda = LIGHT_SPEED / B1I_CARRIER_FREQ;
        let expected = -(r1 - r0) * LIGHT_SPEED / (config.macro_step * lambda);
        assert!((ch.state().carrier_freq - expected).abs() < 1e-6);

        let coherent = config.code_rate
            + ch.state().carrier_freq * config.code_rate / config.carrier_freq;
        assert!((ch.state().code_freq - coherent).abs() < 1e-9);
    }

    #[test]
    fn test_timing_decomposition() {
        let config = small_config();
        // tau = (0 + 0.2 - 0.0712345) s = 128.7655 ms
        let mut ch = channel(&config, vec![0.0712345], vec![50.0]);
        ch.produce_next_iq();
        assert_eq!(ch.data_bit_index(), 128 / 20);
        assert_eq!(ch.nh_bit_index(), 128 % 20);
        // one sample already advanced the code phase by a chip
        let expected_chips = 0.7655 * 8.0 + 1.0;
        assert!((ch.state().code_phase - expected_chips).abs() < 1e-6);
    }

    #[test]
    fn test_gain_from_path_loss_and_elevation() {
        let config = small_config();
        let rho = config.path_loss_ref / LIGHT_SPEED;
        let mut ch = channel(&config, vec![rho], vec![90.0]);
        ch.produce_next_iq();
        assert_eq!(ch.state().gain, 128);

        let mut low = channel(&config, vec![rho], vec![2.0]);
        low.produce_next_iq();
        let expected = (LookupTables::shared().antenna[17] * 128.0).round() as i32;
        assert_eq!(low.state().gain, expected);
    }

    #[test]
    fn test_carrier_steps_once_per_code_period() {
        let config = small_config();
        // 10 ns of delay change per 10 ms step
        let mut ch = channel(&config, vec![0.07, 0.07000001], vec![50.0]);
        ch.render(config.window_length);
        ch.produce_next_iq();
        let step = ch.state().carrier_phase_step;
        assert_ne!(step, 0);

        let mut last = ch.state().carrier_phase;
        let mut changes = 0;
        for _ in 0..40 {
            ch.produce_next_iq();
            if ch.state().carrier_phase != last {
                assert_eq!(ch.state().carrier_phase, last.wrapping_add_signed(step));
                changes += 1;
                last = ch.state().carrier_phase;
            }
        }
        // 40 samples at 8 samples per code period
        assert_eq!(changes, 5);
    }

    #[test]
    fn test_nh_wrap_advances_data_bit() {
        let config = small_config();
        // tau = 139.5625 ms: code period 139 (data bit 6, NH bit 19), 4.5 chips in
        let mut ch = channel(&config, vec![0.0604375], vec![50.0]);

        ch.render(3);
        assert_eq!(ch.data_bit_index(), 6);
        assert_eq!(ch.nh_bit_index(), 19);
        assert!((ch.state().code_phase - 7.5).abs() < 1e-6);

        ch.produce_next_iq();
        assert_eq!(ch.data_bit_index(), 7);
        assert_eq!(ch.nh_bit_index(), 0);
    }

    #[test]
    fn test_delay_outside_guard_is_rejected() {
        let config = small_config();
        for bad in [0.25, 0.2, 0.0, -0.01, f64::INFINITY, f64::NAN] {
            let err = try_channel(&config, vec![0.07, bad], vec![50.0]).unwrap_err();
            match err {
                ConfigError::DelayOutOfRange { channel, step, .. } => {
                    assert_eq!((channel, step), (0, 1), "delay {}", bad);
                }
                other => panic!("unexpected error for delay {}: {:?}", bad, other),
            }
        }
        assert!(try_channel(&config, vec![0.07, 0.1999], vec![50.0]).is_ok());
    }
}
