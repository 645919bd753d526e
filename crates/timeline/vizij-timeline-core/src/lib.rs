//! Vizij Timeline Core (engine-agnostic)
//!
//! Compiles a declarative, possibly nested list of animation steps into one
//! drivable timeline: per-property output tables, one driver and one
//! interpolation per property, and a sequence of per-step parallel groups.
//!
//! Pipeline: `flatten_steps` -> `fold_steps` -> `CompiledTimeline`.
//! The `driver` module is a tick-driven reference implementation of the
//! tweening primitives the timeline is assembled from; hosts drive it with
//! `update(dt_ms)` once per frame and read `CompiledTimeline::style()`.

pub mod accumulator;
pub mod compile;
pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod flatten;
pub mod interpolate;
pub mod json;
pub mod property;
pub mod step;
pub mod timeline;

// Re-exports for consumers (hosts/adapters)
pub use accumulator::{InitialValues, OutputAccumulator};
pub use compile::{fold_steps, CompiledSteps, PropertyAdvance, StepPlan};
pub use config::{AngleUnit, CompileConfig, UnknownPropertyPolicy, DEFAULT_DURATION_MS};
pub use driver::{Animation, DriverValue, Parallel, Sequence, Tick, Timing};
pub use easing::Easing;
pub use error::{Result, TimelineError};
pub use flatten::{flatten_steps, FlatStep};
pub use interpolate::{Interpolation, OutputFormat, StyleValue};
pub use json::{parse_timeline_json, parse_timeline_json_with, timeline_from_value};
pub use property::{
    Property, PropertyMap, ALL_PROPERTIES, OTHER_PROPERTIES, TRANSFORM_PROPERTIES,
};
pub use step::{OpaqueStep, PropertyConfig, Step, StepConfig, Target, TimelineSpec};
pub use timeline::{CompiledTimeline, PlaybackState, Style};

/// Compile a timeline spec with the default configuration.
pub fn compose_timeline(spec: TimelineSpec) -> Result<CompiledTimeline> {
    CompiledTimeline::compile(spec)
}
