//! View configuration loaded from environment variables.

use crate::constants::{
    CARET_BLINK_MS_ENV, DEFAULT_CARET_BLINK_MS, DEFAULT_FONT_SIZE, DEFAULT_GUTTER_OPACITY,
    DEFAULT_LINE_HEIGHT_FACTOR, FONT_SIZE_ENV, GUTTER_OPACITY_ENV, LINE_HEIGHT_FACTOR_ENV,
    PERF_LOG_ENV,
};
use crate::error::ConfigError;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Rendering knobs that are not part of the theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub font_size: f32,
    pub line_height_factor: f32,
    pub caret_blink_period: Duration,
    pub gutter_opacity: f32,
    /// Emit one `info!` per frame under the perf target.
    pub perf_log: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            line_height_factor: DEFAULT_LINE_HEIGHT_FACTOR,
            caret_blink_period: Duration::from_millis(DEFAULT_CARET_BLINK_MS),
            gutter_opacity: DEFAULT_GUTTER_OPACITY,
            perf_log: false,
        }
    }
}

/// Parse a boolean-like flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off` and
/// the empty string. Case-insensitive, surrounding whitespace ignored.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether the flag `name` is set to a truthy value.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<f32, ConfigError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| invalid(key, value))
}

fn parse_opacity(key: &'static str, value: &str) -> Result<f32, ConfigError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
        .ok_or_else(|| invalid(key, value))
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| invalid(key, value))
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    parse_env_flag(value).ok_or_else(|| invalid(key, value))
}

impl ViewConfig {
    /// Load from the environment, falling back per key.
    ///
    /// Invalid values are logged and replaced by their default.
    ///
    /// # Returns
    /// A populated [`ViewConfig`].
    pub fn from_env() -> Self {
        Self::from_lookup_lenient(|key| env::var(key).ok())
    }

    /// Load from the environment, failing on the first invalid value.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Strict load through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            font_size: lookup(FONT_SIZE_ENV)
                .map(|v| parse_positive(FONT_SIZE_ENV, &v))
                .transpose()?
                .unwrap_or(defaults.font_size),
            line_height_factor: lookup(LINE_HEIGHT_FACTOR_ENV)
                .map(|v| parse_positive(LINE_HEIGHT_FACTOR_ENV, &v))
                .transpose()?
                .unwrap_or(defaults.line_height_factor),
            caret_blink_period: lookup(CARET_BLINK_MS_ENV)
                .map(|v| parse_millis(CARET_BLINK_MS_ENV, &v))
                .transpose()?
                .unwrap_or(defaults.caret_blink_period),
            gutter_opacity: lookup(GUTTER_OPACITY_ENV)
                .map(|v| parse_opacity(GUTTER_OPACITY_ENV, &v))
                .transpose()?
                .unwrap_or(defaults.gutter_opacity),
            perf_log: lookup(PERF_LOG_ENV)
                .map(|v| parse_flag(PERF_LOG_ENV, &v))
                .transpose()?
                .unwrap_or(defaults.perf_log),
        })
    }

    fn from_lookup_lenient<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            font_size: lenient(lookup(FONT_SIZE_ENV), defaults.font_size, |v| {
                parse_positive(FONT_SIZE_ENV, v)
            }),
            line_height_factor: lenient(
                lookup(LINE_HEIGHT_FACTOR_ENV),
                defaults.line_height_factor,
                |v| parse_positive(LINE_HEIGHT_FACTOR_ENV, v),
            ),
            caret_blink_period: lenient(
                lookup(CARET_BLINK_MS_ENV),
                defaults.caret_blink_period,
                |v| parse_millis(CARET_BLINK_MS_ENV, v),
            ),
            gutter_opacity: lenient(lookup(GUTTER_OPACITY_ENV), defaults.gutter_opacity, |v| {
                parse_opacity(GUTTER_OPACITY_ENV, v)
            }),
            perf_log: lenient(lookup(PERF_LOG_ENV), defaults.perf_log, |v| {
                parse_flag(PERF_LOG_ENV, v)
            }),
        }
    }
}

fn lenient<T, F>(raw: Option<String>, default: T, parse: F) -> T
where
    F: FnOnce(&str) -> Result<T, ConfigError>,
{
    match raw.as_deref().map(parse) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            warn!(error = %err, "ignoring invalid configuration value");
            default
        }
        None => default,
    }
}
