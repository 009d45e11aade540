use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::scale::DEFAULT_TICK_COUNT;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "EMISSIONS_VIEWER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field is optional in the JSON file.
///
/// ```json
/// { "data_path": "data.csv", "marker_radius": 5.0, "zoom_scale_extent": [1.0, 8.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// File loaded at startup.
    pub data_path: PathBuf,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Marker radius in points; also the tooltip hit radius.
    pub marker_radius: f32,
    /// Allowed zoom levels `[min, max]`.
    pub zoom_scale_extent: [f64; 2],
    /// Tick count the emissions domain is niced for.
    pub tick_count: usize,
    /// Marker colour as `#rrggbb`.
    pub point_color: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data.csv"),
            window_size: [800.0, 600.0],
            marker_radius: 5.0,
            zoom_scale_extent: [1.0, 8.0],
            tick_count: DEFAULT_TICK_COUNT,
            point_color: "#4682b4".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.zoom_scale_extent;
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom_scale_extent must satisfy 0 < min <= max, got [{lo}, {hi}]"
            )));
        }
        if !(self.marker_radius > 0.0) {
            return Err(ConfigError::Invalid("marker_radius must be positive".into()));
        }
        if self.tick_count == 0 {
            return Err(ConfigError::Invalid("tick_count must be at least 1".into()));
        }
        if crate::color::parse_hex(&self.point_color).is_none() {
            return Err(ConfigError::Invalid(format!(
                "point_color '{}' is not #rrggbb",
                self.point_color
            )));
        }
        Ok(())
    }

    pub fn scale_extent(&self) -> (f64, f64) {
        (self.zoom_scale_extent[0], self.zoom_scale_extent[1])
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Parsed command line: `emissions-viewer [--config <file>] [data-file]`.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

impl CliArgs {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                parsed.config_path = args.next().map(PathBuf::from);
            } else if let Some(path) = arg.strip_prefix("--config=") {
                parsed.config_path = Some(PathBuf::from(path));
            } else if !arg.starts_with('-') && parsed.data_path.is_none() {
                parsed.data_path = Some(PathBuf::from(arg));
            } else {
                log::warn!("Ignoring unknown argument {arg}");
            }
        }
        parsed
    }
}

/// Resolve the effective config: `--config`, then the environment variable,
/// then defaults. A positional data file overrides `data_path`.
/// A broken config file is reported and replaced by defaults.
pub fn resolve(cli: &CliArgs) -> ViewerConfig {
    let config_path = cli
        .config_path
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match config_path {
        Some(path) => match ViewerConfig::load(&path) {
            Ok(config) => {
                log::info!("Using config {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; falling back to defaults");
                ViewerConfig::default()
            }
        },
        None => ViewerConfig::default(),
    };

    if let Some(data_path) = &cli.data_path {
        config.data_path = data_path.clone();
    }
    config
}
