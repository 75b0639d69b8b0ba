//! Error types for the fallible edges of the crate.
//!
//! Stepping never fails. Errors only come from validating host input,
//! sending a command to the wrong scenario, or loading presets from disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ScenarioKind;

/// A parameter outside its documented domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("parameter `{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("parameter `{name}` = {value} is out of range: expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// A request the running scenario cannot honour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("`{operation}` is only available for the {expected} scenario, not {actual}")]
    WrongScenario {
        operation: &'static str,
        expected: ScenarioKind,
        actual: ScenarioKind,
    },

    #[error("step size must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error(transparent)]
    Parameters(#[from] ParameterError),
}

/// Error type for preset loading operations.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("preset not found: {0}")]
    NotFound(String),

    #[error("preset `{name}` has invalid parameters: {source}")]
    Invalid {
        name: String,
        #[source]
        source: SimError,
    },
}
