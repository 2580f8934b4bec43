use std::io;
use std::path::PathBuf;

use b1i_sim_rs::io::{IqSink, SampleFormat};
use b1i_sim_rs::ui::{ProgressManager, print_run_header};
use b1i_sim_rs::utils::consts::{DEFAULT_OUTPUT, DEFAULT_SAMPLE_RATE};
use b1i_sim_rs::utils::dump::write_json;
use b1i_sim_rs::utils::logging::{init_logging, level_for_verbosity};
use b1i_sim_rs::{Scenario, SignalConfig, Simulation};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "BeiDou B1I baseband IQ signal synthesizer", long_about = None)]
struct Cli {
    /// Scenario JSON file, "-" for stdin
    #[arg(short, long)]
    scenario: String,

    /// Output file, "-" for stdout
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,

    #[arg(short, long, value_enum, default_value_t = SampleFormat::Iq8)]
    format: SampleFormat,

    /// Sampling rate [Hz]
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Seconds to synthesize (defaults to the scenario length)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Render channels on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,

    #[arg(long)]
    no_progress: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));

    let scenario = match cli.scenario.as_str() {
        "-" => Scenario::from_reader(io::stdin())?,
        path => Scenario::from_file(path)?,
    };
    let config = SignalConfig::b1i(cli.sample_rate)?;

    let steps = match cli.duration {
        Some(seconds) => config.samples_for(seconds).div_ceil(config.window_length),
        None => scenario.series_len(),
    };
    print_run_header(&config, &scenario, steps);

    let sink = IqSink::create(&cli.output, cli.format, config.sample_rate.round() as u32)?;

    let mut sim = Simulation::new(&scenario, config)?;
    if let Err(e) = sim.install_interrupt_handler() {
        warn!("Ctrl+C handler not installed: {}", e);
    }

    let progress = if cli.no_progress {
        ProgressManager::hidden()
    } else {
        ProgressManager::new()
    };
    let summary = sim.run(sink, steps, cli.parallel, &progress)?;
    progress.finish_all();

    if let Some(path) = cli.summary {
        write_json(&summary, &path)?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}
