//! Configuration file loading with precedence handling.

use crate::viewport::LayoutParams;
use crate::window::{DensityClass, DensityTable, Footprint, GridGeometry, SliderConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TRIAGE_VIEW_CONFIG";

/// Environment variable overriding the slider density class.
pub const DENSITY_ENV: &str = "TRIAGE_VIEW_DENSITY";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/triage-view/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Grid footprint used by the virtual window.
    #[serde(default)]
    pub grid: Option<GridSection>,

    /// Overlay layout tuning.
    #[serde(default)]
    pub overlay: Option<OverlaySection>,

    /// Position slider tuning.
    #[serde(default)]
    pub slider: Option<SliderSection>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// `[grid]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    pub tile_width: Option<f32>,
    pub tile_height: Option<f32>,
    pub gap: Option<f32>,
    pub overscan: Option<usize>,
}

/// `[overlay]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OverlaySection {
    pub edge_padding: Option<f32>,
    pub gap: Option<f32>,
    pub min_tile_px: Option<f32>,
    pub side_panel_width: Option<f32>,
    pub resize_debounce_ms: Option<u64>,
    /// Open the overlay in compare mode by default.
    pub compare: Option<bool>,
}

/// `[slider]` section.
///
/// ```toml
/// [slider]
/// density = "compact"
/// throttle_ms = 80
///
/// [slider.densities.compact]
/// edge = 100.0
/// gap = 2.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SliderSection {
    pub density: Option<DensityClass>,
    pub throttle_ms: Option<u64>,
    pub min_thumb: Option<f32>,
    pub densities: Option<DensitiesSection>,
}

/// `[slider.densities]` section; each class is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DensitiesSection {
    pub compact: Option<Footprint>,
    pub comfortable: Option<Footprint>,
    pub spacious: Option<Footprint>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Virtual window grid.
    pub grid: GridGeometry,
    /// Overlay layout parameters.
    pub overlay: LayoutParams,
    /// Whether the overlay opens in compare mode.
    pub compare_default: bool,
    /// Slider tuning.
    pub slider: SliderConfig,
    /// Initial density class.
    pub density: DensityClass,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            grid: GridGeometry::default(),
            overlay: LayoutParams::default(),
            compare_default: false,
            slider: SliderConfig::default(),
            density: DensityClass::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Overrides collected from CLI flags. `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub density: Option<DensityClass>,
    pub compare: Option<bool>,
    pub log_file_path: Option<PathBuf>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/triage-view/triage-view.log` on Unix-like systems,
/// or the platform equivalent. Falls back to the current directory if no
/// state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("triage-view").join("triage-view.log")
    } else {
        PathBuf::from("triage-view.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/triage-view/config.toml` on Unix, or `None` if no
/// config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("triage-view").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TRIAGE_VIEW_CONFIG` environment variable
/// 3. Default path `~/.config/triage-view/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// Every `Some` field replaces its default; everything else is kept.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let grid = match config.grid {
        Some(g) => GridGeometry {
            tile_width: g.tile_width.unwrap_or(defaults.grid.tile_width),
            tile_height: g.tile_height.unwrap_or(defaults.grid.tile_height),
            gap: g.gap.unwrap_or(defaults.grid.gap),
            overscan: g.overscan.unwrap_or(defaults.grid.overscan),
        },
        None => defaults.grid,
    };

    let overlay_section = config.overlay.unwrap_or_default();
    let overlay = LayoutParams {
        edge_padding: overlay_section
            .edge_padding
            .unwrap_or(defaults.overlay.edge_padding),
        gap: overlay_section.gap.unwrap_or(defaults.overlay.gap),
        min_tile_px: overlay_section
            .min_tile_px
            .unwrap_or(defaults.overlay.min_tile_px),
        side_panel_width: overlay_section
            .side_panel_width
            .unwrap_or(defaults.overlay.side_panel_width),
        resize_debounce: overlay_section
            .resize_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.overlay.resize_debounce),
    };

    let slider_section = config.slider.unwrap_or_default();
    let densities = slider_section.densities.unwrap_or_default();
    let table = DensityTable {
        compact: densities.compact.unwrap_or(defaults.slider.densities.compact),
        comfortable: densities
            .comfortable
            .unwrap_or(defaults.slider.densities.comfortable),
        spacious: densities.spacious.unwrap_or(defaults.slider.densities.spacious),
    };
    let slider = SliderConfig {
        densities: table,
        throttle: slider_section
            .throttle_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.slider.throttle),
        min_thumb: slider_section.min_thumb.unwrap_or(defaults.slider.min_thumb),
    };

    ResolvedConfig {
        grid,
        overlay,
        compare_default: overlay_section.compare.unwrap_or(defaults.compare_default),
        slider,
        density: slider_section.density.unwrap_or(defaults.density),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TRIAGE_VIEW_DENSITY`: override the density class. Unknown values are
///   logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(DENSITY_ENV) {
        match value.parse::<DensityClass>() {
            Ok(density) => config.density = density,
            Err(reason) => warn!(%reason, "Ignoring {}", DENSITY_ENV),
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags that were explicitly set
/// are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(density) = cli.density {
        config.density = density;
    }

    if let Some(compare) = cli.compare {
        config.compare_default = compare;
    }

    if let Some(path) = cli.log_file_path {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
