//! Compiled timeline: assembles the folded step plans into one drivable
//! sequence and exposes the live style, playback controls, reset and
//! duplicate.
//!
//! Pipeline: flatten -> fold (accumulator + plans) -> one driver per property
//! -> one interpolation per property -> sequence of per-step parallel groups.

use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::accumulator::{InitialValues, OutputAccumulator};
use crate::compile::{fold_steps, CompiledSteps, StepPlan};
use crate::config::CompileConfig;
use crate::driver::{Animation, DriverValue, Parallel, Sequence, Tick, Timing};
use crate::error::Result;
use crate::flatten::{flatten_steps, FlatStep};
use crate::interpolate::{Interpolation, StyleValue};
use crate::property::{Property, PropertyMap, TRANSFORM_PROPERTIES};
use crate::step::{Step, TimelineSpec};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    Completed,
}

/// Current sampled style: transform entries in registry order plus opacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub transform: Vec<(Property, StyleValue)>,
    pub opacity: f32,
}

impl Style {
    pub fn get(&self, property: Property) -> Option<StyleValue> {
        if property == Property::Opacity {
            return Some(StyleValue::Number(self.opacity));
        }
        self.transform
            .iter()
            .find_map(|(p, v)| (*p == property).then_some(*v))
    }
}

struct TransformEntry<'a>(Property, &'a StyleValue);

impl Serialize for TransformEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.name(), self.1)?;
        map.end()
    }
}

/// `{"transform":[{"translateX":0},{"rotate":"0deg"},..],"opacity":1}`
impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let entries: Vec<TransformEntry<'_>> = self
            .transform
            .iter()
            .map(|(p, v)| TransformEntry(*p, v))
            .collect();
        let mut st = serializer.serialize_struct("Style", 2)?;
        st.serialize_field("transform", &entries)?;
        st.serialize_field("opacity", &self.opacity)?;
        st.end()
    }
}

pub struct CompiledTimeline {
    spec: Arc<TimelineSpec>,
    config: CompileConfig,
    flattened: Vec<FlatStep>,
    outputs: OutputAccumulator,
    drivers: PropertyMap<DriverValue>,
    interpolations: PropertyMap<Interpolation>,
    sequence: Sequence,
    state: PlaybackState,
}

impl CompiledTimeline {
    /// Compile with the default configuration.
    pub fn compile(spec: impl Into<Arc<TimelineSpec>>) -> Result<Self> {
        Self::compile_with(spec, CompileConfig::default())
    }

    pub fn compile_with(spec: impl Into<Arc<TimelineSpec>>, config: CompileConfig) -> Result<Self> {
        let spec = spec.into();
        let flattened = flatten_steps(&spec.steps);
        let CompiledSteps {
            accumulator: outputs,
            plans,
        } = fold_steps(&spec.initial_values, &flattened, &config)?;

        let drivers = PropertyMap::from_fn(|_| DriverValue::new(0.0));
        let interpolations = drivers.map(|p, driver| {
            Interpolation::for_property(
                p,
                driver.clone(),
                outputs.values(p).to_vec(),
                config.angle_unit,
            )
        });
        let groups: Vec<Box<dyn Animation>> = plans
            .into_iter()
            .map(|plan| assemble_step(plan, &drivers))
            .collect();
        log::debug!(
            "compiled timeline: {} top-level steps, {} flattened, {} groups",
            spec.steps.len(),
            flattened.len(),
            groups.len()
        );

        Ok(Self {
            spec,
            config,
            flattened,
            outputs,
            drivers,
            interpolations,
            sequence: Sequence::new(groups),
            state: PlaybackState::Idle,
        })
    }

    /// Current value of every transform property plus opacity, read from the
    /// live drivers.
    pub fn style(&self) -> Style {
        let transform = TRANSFORM_PROPERTIES
            .iter()
            .map(|&p| (p, self.interpolations[p].sample()))
            .collect();
        Style {
            transform,
            opacity: self.interpolations[Property::Opacity].sample().value(),
        }
    }

    pub fn interpolation(&self, property: Property) -> &Interpolation {
        &self.interpolations[property]
    }

    pub fn interpolations(&self) -> &PropertyMap<Interpolation> {
        &self.interpolations
    }

    /// Committed values per property; fixed after compilation.
    pub fn outputs(&self) -> &OutputAccumulator {
        &self.outputs
    }

    /// Original, unflattened steps.
    pub fn steps(&self) -> &[Step] {
        &self.spec.steps
    }

    pub fn flattened_steps(&self) -> &[FlatStep] {
        &self.flattened
    }

    pub fn initial_values(&self) -> &InitialValues {
        &self.spec.initial_values
    }

    pub fn spec(&self) -> &Arc<TimelineSpec> {
        &self.spec
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// This timeline as a step of an enclosing compilation.
    pub fn as_step(&self) -> Step {
        Step::Nested(Arc::clone(&self.spec))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Number of sequential groups (one per flattened step).
    pub fn group_count(&self) -> usize {
        self.sequence.len()
    }

    /// Index of the group currently playing.
    pub fn current_group(&self) -> usize {
        self.sequence.cursor()
    }

    /// Rewind every driver to 0 and the sequence to its first group.
    /// Outputs and interpolations are kept as-is.
    pub fn reset(&mut self) {
        for driver in self.drivers.values() {
            driver.set(0.0);
        }
        self.sequence.reset();
        self.state = PlaybackState::Idle;
        log::debug!("timeline reset");
    }

    /// A fresh, independent timeline compiled from the original spec and
    /// initial values.
    pub fn duplicate(&self) -> Result<Self> {
        Self::compile_with(Arc::clone(&self.spec), self.config.clone())
    }
}

fn assemble_step(plan: StepPlan, drivers: &PropertyMap<DriverValue>) -> Box<dyn Animation> {
    match plan {
        StepPlan::Parallel(advances) => {
            let timings = advances
                .into_iter()
                .map(|a| {
                    Box::new(Timing::new(
                        drivers[a.property].clone(),
                        a.to_index as f32,
                        a.duration,
                        a.easing,
                    )) as Box<dyn Animation>
                })
                .collect();
            Box::new(Parallel::new(timings))
        }
        StepPlan::Opaque(opaque) => opaque.build(),
    }
}

impl Animation for CompiledTimeline {
    /// Starting a completed timeline replays it from the beginning.
    fn start(&mut self) {
        if self.state == PlaybackState::Completed {
            self.reset();
        }
        self.state = PlaybackState::Running;
        self.sequence.start();
    }

    fn update(&mut self, dt: f32) -> Tick {
        match self.state {
            PlaybackState::Idle => Tick::Idle,
            PlaybackState::Completed => Tick::Finished { leftover: dt },
            PlaybackState::Running => {
                let tick = self.sequence.update(dt);
                if tick.is_finished() {
                    self.state = PlaybackState::Completed;
                    log::debug!("timeline completed after {} groups", self.sequence.len());
                }
                tick
            }
        }
    }

    fn stop(&mut self) {
        if self.state == PlaybackState::Running {
            self.sequence.stop();
            self.state = PlaybackState::Idle;
        }
    }

    fn reset(&mut self) {
        CompiledTimeline::reset(self);
    }
}

impl From<&CompiledTimeline> for Step {
    fn from(timeline: &CompiledTimeline) -> Self {
        timeline.as_step()
    }
}

impl fmt::Debug for CompiledTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTimeline")
            .field("state", &self.state)
            .field("steps", &self.spec.steps.len())
            .field("flattened", &self.flattened.len())
            .field("outputs", &self.outputs)
            .field("current_group", &self.sequence.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{PropertyConfig, StepConfig};

    fn fade_out() -> TimelineSpec {
        TimelineSpec::new(vec![StepConfig::new()
            .with(Property::Opacity, PropertyConfig::to(0.0).duration(100.0))
            .into()])
    }

    #[test]
    fn state_machine_idle_running_completed() {
        let mut tl = CompiledTimeline::compile(fade_out()).unwrap();
        assert_eq!(tl.state(), PlaybackState::Idle);
        assert_eq!(tl.update(16.0), Tick::Idle);
        tl.start();
        assert_eq!(tl.state(), PlaybackState::Running);
        // Held properties run for the default 300ms.
        assert_eq!(tl.update(200.0), Tick::Running);
        assert!(tl.update(200.0).is_finished());
        assert_eq!(tl.state(), PlaybackState::Completed);
        tl.reset();
        assert_eq!(tl.state(), PlaybackState::Idle);
    }

    #[test]
    fn stop_keeps_position() {
        let mut tl = CompiledTimeline::compile(fade_out()).unwrap();
        tl.start();
        tl.update(50.0);
        tl.stop();
        assert_eq!(tl.state(), PlaybackState::Idle);
        assert!((tl.style().opacity - 0.5).abs() < 1e-5);
        assert_eq!(tl.update(50.0), Tick::Idle);
        assert!((tl.style().opacity - 0.5).abs() < 1e-5);
    }

    #[test]
    fn restart_after_completion_replays() {
        let mut tl = CompiledTimeline::compile(fade_out()).unwrap();
        tl.start();
        tl.update(1_000.0);
        assert_eq!(tl.style().opacity, 0.0);
        tl.start();
        assert_eq!(tl.style().opacity, 1.0);
        tl.update(50.0);
        assert!((tl.style().opacity - 0.5).abs() < 1e-5);
    }

    #[test]
    fn as_step_shares_the_original_spec() {
        let tl = CompiledTimeline::compile(fade_out()).unwrap();
        match tl.as_step() {
            Step::Nested(spec) => assert!(Arc::ptr_eq(&spec, tl.spec())),
            other => panic!("expected nested step, got {other:?}"),
        }
    }
}
