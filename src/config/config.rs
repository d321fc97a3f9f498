//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::concat::{ScaleLimits, Strategy};
use crate::corpus::phones;

/// Concatenation strategy selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Play unit audio back to back
    Base,
    /// Cross-fade every join with the natural continuation of the previous unit
    Overlap,
    /// Pitch-synchronous resynthesis towards target durations (default)
    #[default]
    PitchSync,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Base => write!(f, "base"),
            StrategyKind::Overlap => write!(f, "overlap"),
            StrategyKind::PitchSync => write!(f, "pitch-sync"),
        }
    }
}

/// Unit concatenator application configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "unit-concatenator")]
#[command(author, version, about = "Join selected voice-corpus units into a waveform", long_about = None)]
pub struct AppConfig {
    /// List the phone inventory and exit
    #[arg(long)]
    pub list_phones: bool,

    /// Show detailed information about a specific phone and exit
    #[arg(long)]
    pub phone_info: Option<String>,

    /// Directory containing the voice (timeline.bin and units.json)
    #[arg(long, short = 'd', env = "UNIT_VOICE_DIR", default_value_os_t = default_voice_dir())]
    pub voice_dir: PathBuf,

    /// Selected-unit request (JSON)
    #[arg(long, short = 'r')]
    pub request: Option<PathBuf>,

    /// Output WAV file
    #[arg(long, short = 'o', default_value = "output.wav")]
    pub output: PathBuf,

    /// How units are joined
    #[arg(long, value_enum, default_value = "pitch-sync")]
    pub strategy: StrategyKind,

    /// Sample rate of the WAV file (defaults to the timeline rate)
    #[arg(long)]
    pub output_rate: Option<u32>,

    /// Smallest duration scale factor applied by pitch-synchronous resynthesis
    #[arg(long, default_value = "0.5", value_parser = parse_scale)]
    pub min_time_scale: f64,

    /// Largest duration scale factor applied by pitch-synchronous resynthesis
    #[arg(long, default_value = "2.0", value_parser = parse_scale)]
    pub max_time_scale: f64,

    /// Smallest pitch scale factor applied by pitch-synchronous resynthesis
    #[arg(long, default_value = "0.5", value_parser = parse_scale)]
    pub min_pitch_scale: f64,

    /// Largest pitch scale factor applied by pitch-synchronous resynthesis
    #[arg(long, default_value = "2.0", value_parser = parse_scale)]
    pub max_pitch_scale: f64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let config = Self::parse();

        // Handle phone listing commands
        if config.list_phones {
            phones::print_phones();
            std::process::exit(0);
        }

        if let Some(ref phone) = config.phone_info {
            match phones::print_phone_info(phone) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Get the path to the voice timeline.
    pub fn timeline_path(&self) -> PathBuf {
        self.voice_dir.join("timeline.bin")
    }

    /// Get the path to the voice unit index.
    pub fn unit_index_path(&self) -> PathBuf {
        self.voice_dir.join("units.json")
    }

    /// Scale bounds for pitch-synchronous resynthesis.
    pub fn scale_limits(&self) -> ScaleLimits {
        ScaleLimits {
            min_time_scale: self.min_time_scale,
            max_time_scale: self.max_time_scale,
            min_pitch_scale: self.min_pitch_scale,
            max_pitch_scale: self.max_pitch_scale,
        }
    }

    /// Build the concatenation strategy.
    pub fn build_strategy(&self) -> Strategy {
        match self.strategy {
            StrategyKind::Base => Strategy::Base,
            StrategyKind::Overlap => Strategy::Overlap,
            StrategyKind::PitchSync => Strategy::pitch_sync(self.scale_limits()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.request.is_none() {
            anyhow::bail!("No request given (use --request)");
        }

        // Check voice directory exists
        if !self.voice_dir.exists() {
            anyhow::bail!("Voice directory does not exist: {}", self.voice_dir.display());
        }

        for path in [self.timeline_path(), self.unit_index_path()] {
            if !path.exists() {
                anyhow::bail!("Required voice file not found: {}", path.display());
            }
        }

        if self.min_time_scale > self.max_time_scale {
            anyhow::bail!("Minimum time scale {} exceeds maximum {}", self.min_time_scale, self.max_time_scale);
        }

        if self.min_pitch_scale > self.max_pitch_scale {
            anyhow::bail!("Minimum pitch scale {} exceeds maximum {}", self.min_pitch_scale, self.max_pitch_scale);
        }

        if self.output_rate == Some(0) {
            anyhow::bail!("Output sample rate must be positive");
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Voice directory: {}", self.voice_dir.display());
        if let Some(ref request) = self.request {
            info!("  Request: {}", request.display());
        }
        info!("  Output: {}", self.output.display());
        info!("  Strategy: {}", self.strategy);
        if let Some(rate) = self.output_rate {
            info!("  Output rate: {} Hz", rate);
        }
        if matches!(self.strategy, StrategyKind::PitchSync) {
            info!("  Time scale: {} - {}", self.min_time_scale, self.max_time_scale);
            info!("  Pitch scale: {} - {}", self.min_pitch_scale, self.max_pitch_scale);
        }
    }
}

/// Get the default voice directory (~/.unit-concatenator/voice).
fn default_voice_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".unit-concatenator").join("voice")
    } else {
        PathBuf::from("voice")
    }
}

/// Parse and validate a scale factor (strictly positive).
fn parse_scale(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("scale factor must be positive, got {}", value))
    }
}
