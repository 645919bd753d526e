//! Step specifications: the declarative input of a timeline.
//!
//! A step is decided at construction time to be one of:
//! - `Configuration`: per-property targets committed by the compiler,
//! - `Opaque`: a pre-built animation sequenced as-is and never introspected,
//! - `Nested`: the original specification of another timeline, spliced in place
//!   by the flattener.

use std::fmt;
use std::sync::Arc;

use crate::accumulator::InitialValues;
use crate::driver::Animation;
use crate::easing::Easing;
use crate::property::{Property, PropertyMap};

/// Pure resolver for a computed target: (property, previous value) -> next value.
pub type TargetFn = Arc<dyn Fn(Property, f32) -> f32 + Send + Sync>;

/// Where a property should end up after a step.
#[derive(Clone)]
pub enum Target {
    Value(f32),
    Computed(TargetFn),
}

impl Target {
    /// Computed target from the previous committed value.
    pub fn from_previous(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Target::Computed(Arc::new(move |_: Property, previous: f32| f(previous)))
    }

    /// Computed target that also sees which property it resolves.
    pub fn computed(f: impl Fn(Property, f32) -> f32 + Send + Sync + 'static) -> Self {
        Target::Computed(Arc::new(f))
    }

    pub fn resolve(&self, property: Property, previous: f32) -> f32 {
        match self {
            Target::Value(v) => *v,
            Target::Computed(f) => f(property, previous),
        }
    }
}

impl From<f32> for Target {
    fn from(v: f32) -> Self {
        Target::Value(v)
    }
}

impl From<f64> for Target {
    fn from(v: f64) -> Self {
        Target::Value(v as f32)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Target::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Target configuration for one property within one step.
#[derive(Clone, Debug)]
pub struct PropertyConfig {
    pub to: Target,
    /// Milliseconds; the compile config's default when `None`.
    pub duration: Option<f32>,
    /// Linear when `None`.
    pub easing: Option<Easing>,
}

impl PropertyConfig {
    pub fn to(target: impl Into<Target>) -> Self {
        Self {
            to: target.into(),
            duration: None,
            easing: None,
        }
    }

    /// Shorthand for `PropertyConfig::to(Target::from_previous(f))`.
    pub fn from_previous(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self::to(Target::from_previous(f))
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// Partial map from properties to their configuration for one step.
#[derive(Clone, Debug, Default)]
pub struct StepConfig {
    entries: PropertyMap<Option<PropertyConfig>>,
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: Property, config: PropertyConfig) -> Self {
        self.set(property, config);
        self
    }

    pub fn set(&mut self, property: Property, config: PropertyConfig) {
        self.entries[property] = Some(config);
    }

    pub fn get(&self, property: Property) -> Option<&PropertyConfig> {
        self.entries[property].as_ref()
    }

    /// Properties this step configures, in registry order.
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries
            .iter()
            .filter_map(|(p, c)| c.as_ref().map(|_| p))
    }
}

/// Factory for the animation behind an opaque step.
pub type AnimationFactory = Arc<dyn Fn() -> Box<dyn Animation> + Send + Sync>;

/// A pre-built animation passed through compilation unchanged.
///
/// Every compilation (including each `duplicate`) builds its own instance, so
/// no playback state is shared between timelines.
#[derive(Clone)]
pub struct OpaqueStep {
    label: Option<String>,
    factory: AnimationFactory,
}

impl OpaqueStep {
    pub fn new<A, F>(factory: F) -> Self
    where
        A: Animation + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            label: None,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Animation>),
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn build(&self) -> Box<dyn Animation> {
        (self.factory)()
    }
}

impl fmt::Debug for OpaqueStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueStep")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub enum Step {
    Configuration(StepConfig),
    Opaque(OpaqueStep),
    /// Original (unflattened) specification of another timeline.
    Nested(Arc<TimelineSpec>),
}

impl From<StepConfig> for Step {
    fn from(config: StepConfig) -> Self {
        Step::Configuration(config)
    }
}

impl From<OpaqueStep> for Step {
    fn from(step: OpaqueStep) -> Self {
        Step::Opaque(step)
    }
}

impl From<TimelineSpec> for Step {
    fn from(spec: TimelineSpec) -> Self {
        Step::Nested(Arc::new(spec))
    }
}

/// The original, unflattened input of a compilation.
#[derive(Clone, Debug, Default)]
pub struct TimelineSpec {
    pub steps: Vec<Step>,
    pub initial_values: InitialValues,
}

impl TimelineSpec {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            initial_values: InitialValues::default(),
        }
    }

    pub fn with_initial_values(mut self, initial_values: InitialValues) -> Self {
        self.initial_values = initial_values;
        self
    }

    pub fn push(&mut self, step: impl Into<Step>) {
        self.steps.push(step.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_resolve_against_previous() {
        assert_eq!(Target::Value(4.0).resolve(Property::Scale, 1.0), 4.0);
        let plus_one = Target::from_previous(|v| v + 1.0);
        assert_eq!(plus_one.resolve(Property::TranslateX, 3.0), 4.0);
        let by_prop = Target::computed(|p, v| if p.is_rotation() { v + 90.0 } else { v });
        assert_eq!(by_prop.resolve(Property::Rotate, 0.0), 90.0);
        assert_eq!(by_prop.resolve(Property::Opacity, 0.5), 0.5);
    }

    #[test]
    fn step_config_lists_configured_properties_in_registry_order() {
        let step = StepConfig::new()
            .with(Property::Opacity, PropertyConfig::to(0.0))
            .with(Property::TranslateY, PropertyConfig::to(10.0).duration(50.0));
        let props: Vec<Property> = step.properties().collect();
        assert_eq!(props, vec![Property::TranslateY, Property::Opacity]);
        assert_eq!(step.get(Property::TranslateY).unwrap().duration, Some(50.0));
        assert!(step.get(Property::Scale).is_none());
    }
}
