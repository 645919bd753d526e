//! Compilation configuration for vizij-timeline-core.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Duration applied to a property advance when a step does not specify one.
pub const DEFAULT_DURATION_MS: f32 = 300.0;

/// Unit suffix rendered on rotation-family style values.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Deg,
    Rad,
}

impl AngleUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            AngleUnit::Deg => "deg",
            AngleUnit::Rad => "rad",
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// What the document loader does with step keys outside the property registry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPropertyPolicy {
    /// Fail with `TimelineError::UnknownProperty`.
    #[default]
    Reject,
    /// Log a warning and skip the key.
    Ignore,
}

/// Configuration shared by loading, compilation and duplication.
/// A duplicate is always compiled with the config of its source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileConfig {
    /// Duration (ms) for property advances that omit one.
    pub default_duration_ms: f32,
    pub angle_unit: AngleUnit,
    pub unknown_properties: UnknownPropertyPolicy,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_DURATION_MS,
            angle_unit: AngleUnit::Deg,
            unknown_properties: UnknownPropertyPolicy::Reject,
        }
    }
}

impl CompileConfig {
    /// Held properties take the default duration, so it is checked once
    /// before any step is compiled.
    pub(crate) fn validate(&self) -> Result<()> {
        let duration = self.default_duration_ms;
        if !duration.is_finite() || duration < 0.0 {
            return Err(TimelineError::InvalidDefaultDuration { duration });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: CompileConfig = serde_json::from_str(r#"{ "angleUnit": "rad" }"#).unwrap();
        assert_eq!(cfg.angle_unit, AngleUnit::Rad);
        assert_eq!(cfg.default_duration_ms, DEFAULT_DURATION_MS);
        assert_eq!(cfg.unknown_properties, UnknownPropertyPolicy::Reject);
    }
}
