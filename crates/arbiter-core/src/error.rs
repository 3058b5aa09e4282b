//! # Error Types
//!
//! Structured error hierarchy for the foundational layer. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! - Validation errors name the offending field so callers can report it
//!   without re-deriving context.
//! - Canonicalization failures are a programming-error class: a value that
//!   reaches the canonicalizer has already passed input validation.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum ArbiterError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error validating an identifier or input field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// An address field was empty after trimming.
    #[error("{field} is required")]
    MissingAddress {
        /// The input field that should carry the address.
        field: String,
    },

    /// An address failed normalization.
    #[error("{field} must be a valid public key")]
    InvalidAddress {
        /// The input field that carried the address.
        field: String,
    },

    /// A signed input that must be non-negative was negative.
    #[error("{0} must be non-negative")]
    Negative(&'static str),

    /// A numeric input does not fit its target width.
    #[error("{0} exceeds the supported range")]
    OutOfRange(&'static str),

    /// A digest was not 64 hex characters.
    #[error("invalid payload hash: {0:?}")]
    InvalidHash(String),

    /// An outcome string was neither `Allow` nor `Deny`.
    #[error("invalid outcome {0:?}: expected Allow or Deny")]
    InvalidOutcome(String),
}

/// Error loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The configuration file path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file was not valid YAML for `Settings`.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The configuration file path.
        path: String,
        /// The underlying parse error.
        source: serde_yaml::Error,
    },

    /// An environment override could not be applied.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// The environment variable name.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },
}
