//! TOML Configuration File Support
//!
//! Loads the settings an embedding control loop needs to set up an
//! [`EyeAnimator`]: the default animation, blink and movement toggles, and the
//! fixed tick period.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The file lives at `$XDG_CONFIG_HOME/roboteye/eye.toml` (typically
//! `~/.config/roboteye/eye.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! default_animation = "idle"
//!
//! [blink]
//! enabled = true
//! interval_ms = 900
//!
//! [movement]
//! enabled = true
//! bias = 0.0
//!
//! [playback]
//! step_ms = 40
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `ROBOTEYE_DEFAULT_ANIMATION` | `default_animation` |
//! | `ROBOTEYE_BLINK` | `blink.enabled` |
//! | `ROBOTEYE_BLINK_INTERVAL_MS` | `blink.interval_ms` |
//! | `ROBOTEYE_MOVEMENT` | `movement.enabled` |
//! | `ROBOTEYE_BIAS` | `movement.bias` |
//! | `ROBOTEYE_STEP_MS` | `playback.step_ms` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animator::{EyeAnimator, DEFAULT_BLINK_INTERVAL_MS};
use crate::catalog::AnimationId;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Highest-priority layer that contributed a value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Blink section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkToml {
    /// Autonomous blinking on/off
    pub enabled: Option<bool>,

    /// Milliseconds between autonomous blinks (0 = 1000)
    pub interval_ms: Option<u32>,
}

/// Movement section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementToml {
    /// Bias-driven gaze on/off
    pub enabled: Option<bool>,

    /// Initial horizontal bias, clamped to `[-1, 1]`
    pub bias: Option<f32>,
}

/// Playback section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackToml {
    /// Fixed tick period of the driving loop
    pub step_ms: Option<u32>,
}

/// Root of `eye.toml`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeToml {
    /// Animation the eye starts in
    pub default_animation: Option<String>,

    /// Autonomous blink settings
    pub blink: BlinkToml,

    /// Gaze settings
    pub movement: MovementToml,

    /// Driving loop settings
    pub playback: PlaybackToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Default tick period of the driving loop
pub const DEFAULT_STEP_MS: u32 = 40;

/// Default autonomous blink period
pub const DEFAULT_CONFIG_BLINK_INTERVAL_MS: u32 = 900;

/// Resolved autonomous blink settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlinkConfig {
    /// Autonomous blinking on/off
    pub enabled: bool,
    /// Milliseconds between autonomous blinks (never 0)
    pub interval_ms: u32,
}

/// Resolved gaze settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Bias-driven gaze on/off
    pub enabled: bool,
    /// Initial horizontal bias in `[-1, 1]`
    pub bias: f32,
}

/// Fully resolved eye configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeConfig {
    /// Animation the eye starts in
    pub default_animation: AnimationId,

    /// Autonomous blink settings
    pub blink: BlinkConfig,

    /// Gaze settings
    pub movement: MovementConfig,

    /// Fixed tick period of the driving loop (never 0)
    pub step_ms: u32,

    /// File the configuration was read from, if any
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            default_animation: AnimationId::Idle,
            blink: BlinkConfig {
                enabled: true,
                interval_ms: DEFAULT_CONFIG_BLINK_INTERVAL_MS,
            },
            movement: MovementConfig {
                enabled: true,
                bias: 0.0,
            },
            step_ms: DEFAULT_STEP_MS,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl EyeConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority layer that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source (used after applying CLI overrides)
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check invariants the loaders cannot repair on their own
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when `step_ms` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_ms == 0 {
            return Err(ConfigError::ValidationError(
                "playback.step_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Create an animator initialized and configured from these settings
    #[must_use]
    pub fn build_animator(&self) -> EyeAnimator {
        let mut animator = EyeAnimator::with_default(self.default_animation);
        animator.set_blinking(self.blink.enabled, self.blink.interval_ms);
        animator.set_movement_enabled(self.movement.enabled);
        animator.set_horizontal_bias(self.movement.bias);
        animator
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/roboteye/eye.toml` or
/// `~/.config/roboteye/eye.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roboteye").join("eye.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed or holds
/// invalid values. A missing config file is not an error.
pub fn load_config() -> Result<EyeConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<&Path>) -> Result<EyeConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// `env` is called with each variable name; tests pass a map-backed closure
/// instead of touching the process environment.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<EyeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EyeConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_config = read_toml(config_path)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

fn read_toml(path: &Path) -> Result<EyeToml, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EyeConfig, toml: &EyeToml) -> Result<(), ConfigError> {
    if let Some(ref name) = toml.default_animation {
        config.default_animation = name
            .parse::<AnimationId>()
            .map_err(|e| ConfigError::ValidationError(format!("default_animation: {e}")))?;
    }

    if let Some(enabled) = toml.blink.enabled {
        config.blink.enabled = enabled;
    }
    if let Some(interval) = toml.blink.interval_ms {
        config.blink.interval_ms = normalize_blink_interval(interval);
    }

    if let Some(enabled) = toml.movement.enabled {
        config.movement.enabled = enabled;
    }
    if let Some(bias) = toml.movement.bias {
        config.movement.bias = normalize_bias(bias);
    }

    if let Some(step) = toml.playback.step_ms {
        config.step_ms = step;
    }

    Ok(())
}

/// Apply environment variable overrides to the config
///
/// Values that fail to parse are logged and skipped.
fn apply_env_config<F>(config: &mut EyeConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env("ROBOTEYE_DEFAULT_ANIMATION") {
        match value.parse::<AnimationId>() {
            Ok(id) => {
                config.default_animation = id;
                config.source = ConfigSource::Env;
            }
            Err(e) => {
                tracing::warn!(value = %value, error = %e, "Ignoring ROBOTEYE_DEFAULT_ANIMATION");
            }
        }
    }

    if let Some(enabled) = env_value(&env, "ROBOTEYE_BLINK", parse_bool) {
        config.blink.enabled = enabled;
        config.source = ConfigSource::Env;
    }
    if let Some(interval) = env_value(&env, "ROBOTEYE_BLINK_INTERVAL_MS", parse_u32) {
        config.blink.interval_ms = normalize_blink_interval(interval);
        config.source = ConfigSource::Env;
    }
    if let Some(enabled) = env_value(&env, "ROBOTEYE_MOVEMENT", parse_bool) {
        config.movement.enabled = enabled;
        config.source = ConfigSource::Env;
    }
    if let Some(bias) = env_value(&env, "ROBOTEYE_BIAS", parse_bias) {
        config.movement.bias = normalize_bias(bias);
        config.source = ConfigSource::Env;
    }
    if let Some(step) = env_value(&env, "ROBOTEYE_STEP_MS", parse_u32) {
        config.step_ms = step;
        config.source = ConfigSource::Env;
    }
}

fn env_value<F, T>(env: &F, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.parse().ok()
}

fn parse_bias(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|b| !b.is_nan())
}

fn normalize_blink_interval(interval_ms: u32) -> u32 {
    if interval_ms == 0 {
        tracing::warn!(
            substitute = DEFAULT_BLINK_INTERVAL_MS,
            "Blink interval of 0 ms replaced with default"
        );
        DEFAULT_BLINK_INTERVAL_MS
    } else {
        interval_ms
    }
}

fn normalize_bias(bias: f32) -> f32 {
    let clamped = bias.clamp(-1.0, 1.0);
    if (clamped - bias).abs() > f32::EPSILON {
        tracing::warn!(bias, clamped, "Horizontal bias clamped to [-1, 1]");
    }
    clamped
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Default animation override
    pub default_animation: Option<AnimationId>,

    /// Blink enabled override
    pub blink_enabled: Option<bool>,

    /// Blink interval override (milliseconds)
    pub blink_interval_ms: Option<u32>,

    /// Movement enabled override
    pub movement_enabled: Option<bool>,

    /// Initial bias override
    pub bias: Option<f32>,

    /// Tick period override (milliseconds)
    pub step_ms: Option<u32>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set default animation override
    #[must_use]
    pub fn with_default_animation(mut self, id: AnimationId) -> Self {
        self.default_animation = Some(id);
        self
    }

    /// Set blink enabled override
    #[must_use]
    pub fn with_blink_enabled(mut self, enabled: bool) -> Self {
        self.blink_enabled = Some(enabled);
        self
    }

    /// Set blink interval override
    #[must_use]
    pub fn with_blink_interval_ms(mut self, ms: u32) -> Self {
        self.blink_interval_ms = Some(ms);
        self
    }

    /// Set movement enabled override
    #[must_use]
    pub fn with_movement_enabled(mut self, enabled: bool) -> Self {
        self.movement_enabled = Some(enabled);
        self
    }

    /// Set initial bias override
    #[must_use]
    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = Some(bias);
        self
    }

    /// Set tick period override
    #[must_use]
    pub fn with_step_ms(mut self, ms: u32) -> Self {
        self.step_ms = Some(ms);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_animation.is_none()
            && self.blink_enabled.is_none()
            && self.blink_interval_ms.is_none()
            && self.movement_enabled.is_none()
            && self.bias.is_none()
            && self.step_ms.is_none()
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when the result is invalid
    /// (for example a zero `step_ms`).
    pub fn apply(&self, config: &mut EyeConfig) -> Result<(), ConfigError> {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(id) = self.default_animation {
            config.default_animation = id;
        }
        if let Some(enabled) = self.blink_enabled {
            config.blink.enabled = enabled;
        }
        if let Some(interval) = self.blink_interval_ms {
            config.blink.interval_ms = normalize_blink_interval(interval);
        }
        if let Some(enabled) = self.movement_enabled {
            config.movement.enabled = enabled;
        }
        if let Some(bias) = self.bias.filter(|b| !b.is_nan()) {
            config.movement.bias = normalize_bias(bias);
        }
        if let Some(step) = self.step_ms {
            config.step_ms = step;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
