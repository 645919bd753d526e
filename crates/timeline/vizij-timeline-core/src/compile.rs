//! Step compilation as a fold over the flattened steps.
//!
//! `fold_steps` threads the output accumulator through the steps explicitly:
//! each configuration step is first resolved against the accumulator as it
//! stands (pure), then its targets are committed. Opaque steps pass through
//! and leave the accumulator untouched; whatever they animate was committed by
//! whoever built them.

use crate::accumulator::{InitialValues, OutputAccumulator};
use crate::config::CompileConfig;
use crate::easing::Easing;
use crate::error::{Result, TimelineError};
use crate::flatten::FlatStep;
use crate::property::{Property, ALL_PROPERTIES};
use crate::step::{OpaqueStep, StepConfig};

/// Drive one property's driver to `to_index` within a step's parallel group.
#[derive(Clone, Debug)]
pub struct PropertyAdvance {
    pub property: Property,
    /// Timeline index committed for this step (== accumulator length - 1).
    pub to_index: usize,
    /// Value committed at `to_index`.
    pub target: f32,
    /// Milliseconds.
    pub duration: f32,
    pub easing: Easing,
}

/// Playback plan for one flattened step.
#[derive(Clone, Debug)]
pub enum StepPlan {
    /// One advance per registered property, run concurrently.
    Parallel(Vec<PropertyAdvance>),
    Opaque(OpaqueStep),
}

/// Result of the fold: the final accumulator snapshot and one plan per step.
#[derive(Clone, Debug)]
pub struct CompiledSteps {
    pub accumulator: OutputAccumulator,
    pub plans: Vec<StepPlan>,
}

/// Resolved, not yet committed, target for one property.
#[derive(Clone, Debug)]
struct Resolved {
    property: Property,
    target: f32,
    duration: f32,
    easing: Easing,
}

/// Fold (seeds, flattened steps) into (accumulator, per-step plans).
pub fn fold_steps(
    initial: &InitialValues,
    steps: &[FlatStep],
    cfg: &CompileConfig,
) -> Result<CompiledSteps> {
    cfg.validate()?;
    initial.validate()?;
    let seed = CompiledSteps {
        accumulator: OutputAccumulator::seeded(initial),
        plans: Vec::with_capacity(steps.len()),
    };
    let compiled = steps
        .iter()
        .enumerate()
        .try_fold(seed, |mut acc, (index, step)| {
            let plan = match step {
                FlatStep::Configuration(config) => {
                    let resolved = resolve_step(&acc.accumulator, index, config, cfg)?;
                    StepPlan::Parallel(commit_step(&mut acc.accumulator, resolved))
                }
                FlatStep::Opaque(opaque) => {
                    log::trace!("step {index}: opaque {:?} passed through", opaque.label());
                    StepPlan::Opaque(opaque.clone())
                }
            };
            acc.plans.push(plan);
            Ok::<_, TimelineError>(acc)
        })?;
    debug_assert!(compiled.accumulator.is_rectangular());
    log::debug!(
        "folded {} steps into {} timeline indices",
        compiled.plans.len(),
        compiled.accumulator.len()
    );
    Ok(compiled)
}

/// Resolve every registered property against its last committed value.
/// Properties the step does not mention hold their value.
fn resolve_step(
    acc: &OutputAccumulator,
    index: usize,
    config: &StepConfig,
    cfg: &CompileConfig,
) -> Result<Vec<Resolved>> {
    ALL_PROPERTIES
        .iter()
        .map(|&property| {
            let current = acc.last(property);
            let Some(pc) = config.get(property) else {
                return Ok(Resolved {
                    property,
                    target: current,
                    duration: cfg.default_duration_ms,
                    easing: Easing::Linear,
                });
            };
            let target = pc.to.resolve(property, current);
            if !target.is_finite() {
                return Err(TimelineError::NonFiniteTarget {
                    step: index,
                    property,
                    value: target,
                });
            }
            let duration = pc.duration.unwrap_or(cfg.default_duration_ms);
            if !duration.is_finite() || duration < 0.0 {
                return Err(TimelineError::InvalidDuration {
                    step: index,
                    property,
                    duration,
                });
            }
            Ok(Resolved {
                property,
                target,
                duration,
                easing: pc.easing.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn commit_step(acc: &mut OutputAccumulator, resolved: Vec<Resolved>) -> Vec<PropertyAdvance> {
    resolved
        .into_iter()
        .map(|r| {
            let to_index = acc.commit(r.property, r.target);
            log::trace!("commit {}[{}] = {}", r.property, to_index, r.target);
            PropertyAdvance {
                property: r.property,
                to_index,
                target: r.target,
                duration: r.duration,
                easing: r.easing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Sequence;
    use crate::property::PROPERTY_COUNT;
    use crate::step::PropertyConfig;

    fn config(step: StepConfig) -> FlatStep {
        FlatStep::Configuration(step)
    }

    #[test]
    fn every_configuration_step_commits_every_property() {
        let steps = vec![
            config(StepConfig::new().with(Property::Opacity, PropertyConfig::to(0.0))),
            config(StepConfig::new()),
        ];
        let out = fold_steps(&InitialValues::default(), &steps, &CompileConfig::default())
            .unwrap();
        assert_eq!(out.plans.len(), 2);
        assert_eq!(out.accumulator.len(), 3);
        for (_, values) in out.accumulator.iter() {
            assert_eq!(values.len(), 3);
        }
        match &out.plans[0] {
            StepPlan::Parallel(advances) => {
                assert_eq!(advances.len(), PROPERTY_COUNT);
                assert!(advances.iter().all(|a| a.to_index == 1));
            }
            StepPlan::Opaque(_) => panic!("expected parallel group"),
        }
    }

    #[test]
    fn defaults_apply_to_duration_and_easing() {
        let cfg = CompileConfig {
            default_duration_ms: 120.0,
            ..CompileConfig::default()
        };
        let steps = vec![config(
            StepConfig::new()
                .with(Property::Scale, PropertyConfig::to(2.0))
                .with(Property::Rotate, PropertyConfig::to(45.0).duration(10.0)),
        )];
        let out = fold_steps(&InitialValues::default(), &steps, &cfg).unwrap();
        let StepPlan::Parallel(advances) = &out.plans[0] else {
            panic!("expected parallel group");
        };
        let scale = advances.iter().find(|a| a.property == Property::Scale).unwrap();
        assert_eq!(scale.duration, 120.0);
        assert!(matches!(scale.easing, Easing::Linear));
        let rotate = advances.iter().find(|a| a.property == Property::Rotate).unwrap();
        assert_eq!(rotate.duration, 10.0);
        assert_eq!(rotate.target, 45.0);
    }

    #[test]
    fn opaque_steps_do_not_touch_the_accumulator() {
        let steps = vec![
            FlatStep::Opaque(OpaqueStep::new(|| Sequence::new(Vec::new()))),
            config(StepConfig::new().with(Property::TranslateY, PropertyConfig::to(4.0))),
        ];
        let out = fold_steps(&InitialValues::default(), &steps, &CompileConfig::default())
            .unwrap();
        assert_eq!(out.plans.len(), 2);
        assert!(matches!(out.plans[0], StepPlan::Opaque(_)));
        assert_eq!(out.accumulator.values(Property::TranslateY), &[0.0, 4.0]);
    }

    #[test]
    fn non_finite_target_is_an_error() {
        let steps = vec![
            config(StepConfig::new()),
            config(StepConfig::new().with(
                Property::ScaleX,
                PropertyConfig::from_previous(|v| v / 0.0),
            )),
        ];
        let err = fold_steps(&InitialValues::default(), &steps, &CompileConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            TimelineError::NonFiniteTarget {
                step: 1,
                property: Property::ScaleX,
                value: f32::INFINITY,
            }
        );
    }

    #[test]
    fn invalid_default_duration_rejects_held_steps() {
        let steps = vec![config(StepConfig::new())];
        let nan = CompileConfig {
            default_duration_ms: f32::NAN,
            ..CompileConfig::default()
        };
        let err = fold_steps(&InitialValues::default(), &steps, &nan).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::InvalidDefaultDuration { duration } if duration.is_nan()
        ));

        let negative: CompileConfig =
            serde_json::from_str(r#"{ "defaultDurationMs": -5 }"#).unwrap();
        assert_eq!(
            fold_steps(&InitialValues::default(), &steps, &negative).unwrap_err(),
            TimelineError::InvalidDefaultDuration { duration: -5.0 }
        );
        // Checked even when there is nothing to compile.
        assert!(fold_steps(&InitialValues::default(), &[], &negative).is_err());
    }

    #[test]
    #[should_panic(expected = "resolver failed")]
    fn panicking_resolver_reaches_the_caller() {
        let spec = crate::step::TimelineSpec::new(vec![StepConfig::new()
            .with(
                Property::Rotate,
                PropertyConfig::from_previous(|_| panic!("resolver failed")),
            )
            .into()]);
        let _ = crate::timeline::CompiledTimeline::compile(spec);
    }

    #[test]
    fn negative_duration_is_an_error() {
        let steps = vec![config(
            StepConfig::new().with(Property::Opacity, PropertyConfig::to(0.0).duration(-1.0)),
        )];
        let err = fold_steps(&InitialValues::default(), &steps, &CompileConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TimelineError::InvalidDuration {
                step: 0,
                property: Property::Opacity,
                ..
            }
        ));
    }
}
