//! Error types for theme building and configuration parsing.
//!
//! The render path itself has no recoverable errors; these only surface
//! while a theme or a config is being assembled.
use thiserror::Error;

/// Errors raised while building a [`StyleSheet`](crate::style::StyleSheet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        selector: String,
        reason: &'static str,
    },

    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    #[error("invalid value `{value}` for `{property}`")]
    InvalidValue {
        property: &'static str,
        value: String,
    },
}

/// Errors raised while parsing explicit configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}
