use avifbatch_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Raw settings as read from a config file and command-line overrides.
///
/// Numeric fields are signed so that out-of-range values (a negative
/// concurrency limit, for instance) reach validation instead of failing
/// deserialization with an unrelated parse error.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of conversions in flight. Defaults to the logical CPU count.
    #[serde(default)]
    pub concurrency_limit: Option<i64>,

    /// AVIF quality, 0-100.
    #[serde(default = "default_quality")]
    pub quality: i64,

    /// Encoder speed, 1 (slowest, smallest) to 10 (fastest).
    #[serde(default = "default_speed")]
    pub speed: i64,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("src/images")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src/output")
}

fn default_quality() -> i64 {
    50
}

fn default_speed() -> i64 {
    6
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            concurrency_limit: None,
            quality: default_quality(),
            speed: default_speed(),
        }
    }
}

impl Settings {
    /// Validate these settings into an immutable [`BatchConfig`].
    pub fn into_batch_config(self) -> Result<BatchConfig> {
        BatchConfig::try_from(self)
    }
}

/// Validated, immutable configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    concurrency_limit: NonZeroUsize,
    quality: u8,
    speed: u8,
}

impl BatchConfig {
    /// Build a config with default quality and speed.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        concurrency_limit: i64,
    ) -> Result<Self> {
        Settings {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            concurrency_limit: Some(concurrency_limit),
            ..Settings::default()
        }
        .into_batch_config()
    }

    /// Return a copy with a different quality.
    pub fn with_quality(mut self, quality: i64) -> Result<Self> {
        self.quality = validate_quality(quality)?;
        Ok(self)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Maximum number of conversions allowed in flight at once.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit.get()
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }
}

impl TryFrom<Settings> for BatchConfig {
    type Error = Error;

    fn try_from(settings: Settings) -> Result<Self> {
        let limit = settings
            .concurrency_limit
            .unwrap_or_else(|| num_cpus::get() as i64);
        let concurrency_limit = usize::try_from(limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                Error::invalid_config(format!(
                    "concurrency limit must be at least 1 (got {limit})"
                ))
            })?;

        let quality = validate_quality(settings.quality)?;

        if !(1..=10).contains(&settings.speed) {
            return Err(Error::invalid_config(format!(
                "speed must be between 1 and 10 (got {})",
                settings.speed
            )));
        }

        if settings.input_dir.as_os_str().is_empty() {
            return Err(Error::invalid_config("input directory must not be empty"));
        }
        if settings.output_dir.as_os_str().is_empty() {
            return Err(Error::invalid_config("output directory must not be empty"));
        }

        Ok(Self {
            input_dir: settings.input_dir,
            output_dir: settings.output_dir,
            concurrency_limit,
            quality,
            speed: settings.speed as u8,
        })
    }
}

fn validate_quality(quality: i64) -> Result<u8> {
    u8::try_from(quality)
        .ok()
        .filter(|q| *q <= 100)
        .ok_or_else(|| {
            Error::invalid_config(format!("quality must be between 0 and 100 (got {quality})"))
        })
}
