//! Unit Concatenator - render a selected-unit request from a voice corpus to a WAV file.
//!
//! Loads the voice timeline and unit index, resolves the request into selected units,
//! joins them with the configured strategy and writes the result, resampled if asked.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use unit_concatenator::UnitConcatenator;
use unit_concatenator::audio::resampler::resample;
use unit_concatenator::audio::wav::write_wav;
use unit_concatenator::config::AppConfig;
use unit_concatenator::corpus::{MemoryTimeline, Request, UnitIndex};

/// Synthesize one request and write it to the configured output.
///
/// # Arguments
/// * `config` - Validated application configuration
/// * `request_path` - Selected-unit request file
fn render(config: &AppConfig, request_path: &Path) -> Result<()> {
    let timeline_path = config.timeline_path();
    let timeline = MemoryTimeline::open(&timeline_path).with_context(|| format!("Failed to load timeline {}", timeline_path.display()))?;

    let index_path = config.unit_index_path();
    let index = UnitIndex::open(&index_path).with_context(|| format!("Failed to load unit index {}", index_path.display()))?;

    let request = Request::open(request_path).with_context(|| format!("Failed to load request {}", request_path.display()))?;
    let units = request.resolve(&index).context("Request does not match the unit index")?;

    let concatenator = UnitConcatenator::new(&timeline, &index, config.build_strategy());
    let format = concatenator.audio_format();

    let started = Instant::now();
    let stream = concatenator.synthesize(&units).context("Synthesis failed")?;
    let mut samples = stream.into_samples();
    info!(
        "🔊 Synthesized {} units: {} samples ({:.2}s) in {:?}",
        units.len(),
        samples.len(),
        samples.len() as f64 / format.sample_rate as f64,
        started.elapsed()
    );

    let output_rate = config.output_rate.unwrap_or(format.sample_rate);
    if output_rate != format.sample_rate {
        samples = resample(&samples, format.sample_rate, output_rate).context("Failed to resample output")?;
        info!("Resampled {} Hz -> {} Hz", format.sample_rate, output_rate);
    }

    write_wav(&config.output, &samples, output_rate).with_context(|| format!("Failed to write {}", config.output.display()))?;
    info!("💾 Wrote {}", config.output.display());
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if config.verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🗣️  Unit Concatenator v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }
    config.log_config();

    let request_path = config.request.clone().context("No request given")?;
    if let Err(e) = render(&config, &request_path) {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }

    info!("✅ Done");
    Ok(())
}
