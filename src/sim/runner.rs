use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::io::IqSink;
use crate::scenario::Scenario;
use crate::signal::{ChannelSimulator, IqSample, LookupTables, SignalCompositor, SignalConfig};
use crate::ui::{ProgressManager, templates};
use crate::utils::consts::{IQ8_SHIFT, WRITER_QUEUE_DEPTH};

const BAR_ID: &str = "synth";

/// What a finished (or interrupted) run produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub channels: usize,
    pub steps: usize,
    pub samples: u64,
    pub peak_i: u16,
    pub peak_q: u16,
    /// Samples whose I or Q does not survive narrowing to 8 bits
    pub iq8_overflows: u64,
    pub interrupted: bool,
}

impl RunSummary {
    fn record(&mut self, block: &[IqSample]) {
        let limit = (i8::MAX as i16 + 1) << IQ8_SHIFT;
        for s in block {
            self.peak_i = self.peak_i.max(s.i.unsigned_abs());
            self.peak_q = self.peak_q.max(s.q.unsigned_abs());
            if !(-limit..limit).contains(&s.i) || !(-limit..limit).contains(&s.q) {
                self.iq8_overflows += 1;
            }
        }
        self.steps += 1;
    }
}

/// Drives every channel of a scenario through the compositor, one
/// macro-step block at a time.
pub struct Simulation {
    channels: Vec<ChannelSimulator>,
    compositor: SignalCompositor,
    config: SignalConfig,
    running: Arc<AtomicBool>,
}

impl Simulation {
    pub fn new(scenario: &Scenario, config: SignalConfig) -> Result<Self, SimError> {
        let channels = scenario.channels(&config, LookupTables::shared())?;
        info!("Built {} channels", channels.len());
        Ok(Self::from_channels(channels, config))
    }

    pub fn from_channels(channels: Vec<ChannelSimulator>, config: SignalConfig) -> Self {
        Self {
            compositor: SignalCompositor::new(config.output_shift),
            channels,
            config,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag checked at every macro-step boundary; clearing it ends the run.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Clear the running flag on Ctrl+C. Only one handler may exist per process.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let r = self.running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
    }

    /// Render one macro-step worth of samples.
    pub fn render_step(&mut self, parallel: bool) -> Vec<IqSample> {
        let len = self.config.window_length;
        if parallel {
            self.compositor.compose_block_parallel(&mut self.channels, len)
        } else {
            self.compositor.compose_block(&mut self.channels, len)
        }
    }

    /// Render `steps` blocks into `sink`. Blocks are handed to a writer
    /// thread over a bounded queue so rendering and I/O overlap.
    pub fn run(
        &mut self,
        sink: IqSink,
        steps: usize,
        parallel: bool,
        progress: &ProgressManager,
    ) -> Result<RunSummary, SimError> {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<IqSample>>(WRITER_QUEUE_DEPTH);

        let writer = thread::spawn(move || -> std::io::Result<u64> {
            let mut sink = sink;
            for block in rx {
                sink.write_block(&block)?;
            }
            sink.finish()
        });

        progress
            .create_bar(BAR_ID, steps as u64, templates::SYNTH, "")
            .unwrap_or_else(|e| debug!("Progress bar unavailable: {}", e));

        let mut summary = RunSummary {
            channels: self.channels.len(),
            ..Default::default()
        };

        for step in 0..steps {
            if !self.running.load(Ordering::SeqCst) {
                warn!("Interrupted after {} of {} steps", step, steps);
                summary.interrupted = true;
                break;
            }

            let block = self.render_step(parallel);
            summary.record(&block);

            if tx.send(block).is_err() {
                // writer hung up early; its own error is reported by join below
                break;
            }
            let _ = progress.inc(BAR_ID, 1);
        }
        drop(tx);

        let samples = writer.join().map_err(|_| SimError::WriterGone)??;
        summary.samples = samples;

        let _ = progress.finish(
            BAR_ID,
            if summary.interrupted { "interrupted" } else { "done" },
        );

        if summary.iq8_overflows > 0 {
            warn!(
                "{} samples exceed the 8-bit range (peak |I|={}, |Q|={})",
                summary.iq8_overflows, summary.peak_i, summary.peak_q
            );
        }
        info!(
            "Wrote {} samples in {} steps (peak |I|={}, |Q|={})",
            summary.samples, summary.steps, summary.peak_i, summary.peak_q
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::io::SampleFormat;
    use crate::scenario::{Bds2Satellite, SatType};
    use crate::utils::consts::B1I_CARRIER_FREQ;

    fn small_config() -> SignalConfig {
        SignalConfig::new(8000.0, B1I_CARRIER_FREQ, 8000.0, 8, 0.01).unwrap()
    }

    fn scenario() -> Scenario {
        let sat = Bds2Satellite::new("f0", "1", SatType::Meo, vec![0.07; 3], vec![90.0; 3], 0.07)
            .unwrap();
        Scenario::new(vec![Box::new(sat)])
    }

    #[test]
    fn test_run_writes_every_step() {
        let mut sim = Simulation::new(&scenario(), small_config()).unwrap();
        let sink = IqSink::from_writer(Box::new(std::io::sink()), SampleFormat::Iq16).unwrap();
        let summary = sim.run(sink, 3, false, &ProgressManager::hidden()).unwrap();

        assert_eq!(summary.channels, 1);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.samples, 3 * 80);
        assert!(!summary.interrupted);
        assert!(summary.peak_i.max(summary.peak_q) > 0);
        assert_eq!(summary.iq8_overflows, 0);
    }

    #[test]
    fn test_cleared_flag_stops_before_first_step() {
        let mut sim = Simulation::new(&scenario(), small_config()).unwrap();
        sim.running_flag().store(false, Ordering::SeqCst);
        let sink = IqSink::from_writer(Box::new(std::io::sink()), SampleFormat::Iq8).unwrap();
        let summary = sim.run(sink, 5, false, &ProgressManager::hidden()).unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.samples, 0);
    }

    #[test]
    fn test_delay_beyond_guard_fails_before_synthesis() {
        let sat = Bds2Satellite::new("f0", "1", SatType::Geo, vec![0.25], vec![40.0], 0.25)
            .unwrap();
        let scenario = Scenario::new(vec![Box::new(sat)]);
        assert!(matches!(
            Simulation::new(&scenario, small_config()),
            Err(SimError::Config(ConfigError::DelayOutOfRange { step: 0, .. }))
        ));
    }

    #[test]
    fn test_overflow_counting() {
        let mut summary = RunSummary::default();
        summary.record(&[
            IqSample { i: 2047, q: -2048 },
            IqSample { i: 2048, q: 0 },
            IqSample { i: 0, q: -2049 },
        ]);
        assert_eq!(summary.iq8_overflows, 2);
        assert_eq!(summary.peak_i, 2048);
        assert_eq!(summary.peak_q, 2049);
        assert_eq!(summary.steps, 1);
    }
}
