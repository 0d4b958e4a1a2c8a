use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use sdrmock_backend::streaming::waveform::Tone;
use sdrmock_backend::{MockConfig, WaveformKind};
use sdrmock_core::{DEFAULT_MAX_BUFFER, Sample, StreamParams};
use tracing::{info, warn};

/// Run a mock SDR receive stream and drain it like a radio consumer would.
#[derive(Debug, Parser)]
#[command(name = "sdrmock", version)]
struct Args {
    /// JSON config file; inline stream flags are ignored when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample rate in samples per second
    #[arg(long, default_value_t = 48_000.0)]
    rate: f64,

    /// Nominal center frequency in Hz (reported only)
    #[arg(long, default_value_t = 0.0)]
    center_freq: f64,

    /// Linear gain applied to every sample
    #[arg(long, default_value_t = 1.0)]
    gain: f64,

    /// Samples generated per cycle
    #[arg(long, default_value_t = 256)]
    frame_size: usize,

    /// Eviction bound of the shared buffer
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER)]
    max_buffer: usize,

    /// Baseband tone offset in Hz for the initial waveform
    #[arg(long, default_value_t = 1_000.0)]
    tone: f64,

    /// Swap to a tone at this offset halfway through the run
    #[arg(long)]
    swap_tone: Option<f64>,

    /// How long to stream, in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Consumer drain interval in milliseconds
    #[arg(long, default_value_t = 100)]
    drain_interval_ms: u64,
}

impl Args {
    fn mock_config(&self) -> Result<MockConfig> {
        if let Some(path) = &self.config {
            return MockConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()));
        }

        let stream = StreamParams::new(self.rate, self.center_freq, self.gain, self.frame_size);
        Ok(MockConfig::new(stream)
            .with_max_buffer(self.max_buffer)
            .with_waveform(WaveformKind::Tone {
                frequency: self.tone,
                amplitude: 1.0,
                phase: 0.0,
            }))
    }
}

fn mean_power(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.mock_config()?;
    config.validate().context("invalid stream parameters")?;

    let run_for = Duration::try_from_secs_f64(args.duration)
        .context("duration must be a non-negative number of seconds")?;
    let drain_every = Duration::from_millis(args.drain_interval_ms);

    info!(stream = %config.stream, waveform = %config.waveform, max_buffer = config.max_buffer, "starting mock stream");

    let mut streamer = config.build_streamer();
    let buffer = streamer.buffer();
    streamer.start()?;

    let started = Instant::now();
    let mut swapped = false;
    let mut total = 0usize;
    while started.elapsed() < run_for {
        thread::sleep(drain_every);

        if let Some(freq) = args.swap_tone {
            if !swapped && started.elapsed() >= run_for / 2 {
                streamer.set_waveform(Tone::new(freq));
                swapped = true;
                info!(frequency = freq, "swapped waveform");
            }
        }

        let drained = buffer.drain();
        total += drained.len();
        info!(
            drained = drained.len(),
            mean_power = mean_power(&drained),
            "consumer drained buffer"
        );
    }

    streamer.stop()?;

    let perf = streamer.performance();
    let leftover = buffer.len();
    if perf.samples_evicted > 0 {
        warn!(
            evicted = perf.samples_evicted,
            "consumer fell behind; samples were evicted"
        );
    }

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        cycles = perf.cycle_count,
        generated = perf.samples_generated,
        consumed = total,
        leftover,
        effective_rate = total as f64 / elapsed,
        ema_cycle_us = perf.ema_cycle_nanos / 1_000.0,
        load_percent = perf.avg_load_percent,
        "mock stream finished"
    );

    Ok(())
}
