//! Strand CLI: interactive pattern REPL, or one-shot evaluation

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use strand::audio::{AudioOutput, CpalOutput, NullOutput, PlaybackEngine};
use strand::config::EngineConfig;
use strand::repl;
use strand::session::Session;
use strand_core::TempoRange;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "Live-coding pattern evaluator with synthesized playback", long_about = None)]
struct Cli {
    /// Evaluate this pattern, print the JSON result, play it and exit
    pattern: Option<String>,

    /// Seconds between starting a voice and releasing it
    #[arg(long, default_value = "1.0")]
    grace_period: f64,

    /// Slowest accepted tempo; slower patterns are clamped
    #[arg(long, default_value_t = TempoRange::DEFAULT_MIN_BPM)]
    min_bpm: u32,

    /// Fastest accepted tempo; faster patterns are clamped
    #[arg(long, default_value_t = TempoRange::DEFAULT_MAX_BPM)]
    max_bpm: u32,

    /// Pattern file to re-evaluate on every save
    #[arg(short, long)]
    watch: Option<PathBuf>,

    /// Evaluate and schedule without opening an audio device
    #[arg(long)]
    no_audio: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let grace_period = Duration::try_from_secs_f64(self.grace_period)
            .with_context(|| format!("invalid grace period: {}", self.grace_period))?;
        let config = EngineConfig::new()
            .with_grace_period(grace_period)
            .with_tempo_range(self.min_bpm, self.max_bpm);
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.engine_config()?;

    let output: Arc<dyn AudioOutput> = if cli.no_audio {
        Arc::new(NullOutput::new())
    } else {
        Arc::new(CpalOutput::new().context("cannot start audio output")?)
    };
    let engine = PlaybackEngine::new(output, config.clone())?;
    let session = Arc::new(Session::new(engine));

    match cli.pattern {
        Some(text) => {
            let submission = session.submit(&text);
            println!("{}", submission.result.to_json());

            // Let the last voice play out before the engine shuts down
            let last_offset = submission
                .result
                .events
                .last()
                .map_or(0.0, |event| event.offset_seconds);
            let timeout = Duration::from_secs_f64(last_offset) + config.grace_period * 2;
            session.engine().wait_until_idle(timeout);

            if let Some(error) = submission.result.error {
                bail!(error);
            }
            Ok(())
        }
        None => repl::start(session, cli.watch.as_deref()),
    }
}
