//! Error types for timeline compilation and loading.

use serde::{Deserialize, Serialize};

use crate::property::Property;

/// Errors surfaced while loading or compiling a timeline.
///
/// Compilation either fully succeeds or returns one of these before any
/// `CompiledTimeline` exists. A panicking target resolver is not caught.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// A step or initial-values map referenced a name outside the registry.
    #[error("Unknown animatable property: {name}")]
    UnknownProperty { name: String },

    /// A step resolved to NaN or an infinite value.
    #[error("Step {step} produced a non-finite target {value} for {property}")]
    NonFiniteTarget {
        step: usize,
        property: Property,
        value: f32,
    },

    /// Durations must be finite and non-negative.
    #[error("Step {step} has an invalid duration {duration} for {property}")]
    InvalidDuration {
        step: usize,
        property: Property,
        duration: f32,
    },

    /// The configured default duration must be finite and non-negative.
    #[error("Invalid default duration {duration}")]
    InvalidDefaultDuration { duration: f32 },

    /// Initial values must be finite.
    #[error("Invalid initial value {value} for {property}")]
    InvalidInitialValue { property: Property, value: f32 },

    /// The timeline document could not be parsed.
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl TimelineError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        TimelineError::Parse {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        TimelineError::parse(err.to_string())
    }
}

/// Result alias for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;
