//! Optional `flash-point.toml` configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// File read when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "flash-point.toml";

/// Settings for one replay session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ReplayConfig {
    /// Initial board document.
    pub(crate) board: PathBuf,
    /// Step transcript document.
    pub(crate) steps: PathBuf,
    /// Timer driver interval in milliseconds.
    pub(crate) step_interval_ms: u64,
    /// World units per cell for text output.
    pub(crate) cell_size: f32,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub(crate) log_filter: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            board: PathBuf::from("board.json"),
            steps: PathBuf::from("steps.json"),
            step_interval_ms: 10_000,
            cell_size: 19.963_22,
            log_filter: String::from("info"),
        }
    }
}

impl ReplayConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. The default path falls back to built-in
    /// values when the file is absent.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(error) if error.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
                Ok(Self::default())
            }
            Err(error) => Err(error)
                .with_context(|| format!("failed to read configuration at {}", path.display())),
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.step_interval_ms == 0 {
            bail!("step_interval_ms must be greater than zero");
        }
        Ok(config)
    }

    /// Timer driver interval.
    pub(crate) fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use super::ReplayConfig;

    #[test]
    fn partial_files_keep_remaining_defaults() {
        let config = ReplayConfig::parse("steps = \"run-7.json\"\nstep_interval_ms = 250\n")
            .expect("configuration parses");

        assert_eq!(config.steps, PathBuf::from("run-7.json"));
        assert_eq!(config.step_interval(), Duration::from_millis(250));
        assert_eq!(config.board, ReplayConfig::default().board);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn unknown_keys_and_zero_interval_are_rejected() {
        assert!(ReplayConfig::parse("speed = 3").is_err());
        assert!(ReplayConfig::parse("step_interval_ms = 0").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("flash-point-missing-config.toml");
        assert!(ReplayConfig::load(Some(&missing)).is_err());
    }
}
