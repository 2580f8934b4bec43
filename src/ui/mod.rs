pub mod progress;

use tracing::info;

use crate::scenario::Scenario;
use crate::signal::SignalConfig;

pub use progress::{ProgressManager, templates};

pub fn print_run_header(config: &SignalConfig, scenario: &Scenario, steps: usize) {
    info!(
        "B1I synthesis: fs={:.3} MHz, {} channels, {} steps of {} s ({} samples each)",
        config.sample_rate / 1e6,
        scenario.len(),
        steps,
        config.macro_step,
        config.window_length
    );
    for (id, sat) in scenario.iter().enumerate() {
        info!(
            "  ch{:<2} {:<4} {} data bits, {} chips, {} delay samples",
            id,
            sat.sat_type(),
            sat.data().len(),
            sat.ranging_code().len(),
            sat.delay_series().len()
        );
    }
}
