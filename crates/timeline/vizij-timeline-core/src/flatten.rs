//! Step flattening: splice nested timelines' original steps in place.

use crate::step::{OpaqueStep, Step, StepConfig};

/// A step after flattening; nested timelines cannot appear here.
#[derive(Clone, Debug)]
pub enum FlatStep {
    Configuration(StepConfig),
    Opaque(OpaqueStep),
}

/// Depth-first flattening that preserves relative order.
///
/// Only the nested timeline's steps are spliced in; its initial values belong
/// to its own compilation and are not carried into the enclosing one.
pub fn flatten_steps(steps: &[Step]) -> Vec<FlatStep> {
    let mut out = Vec::with_capacity(steps.len());
    flatten_into(steps, &mut out);
    out
}

fn flatten_into(steps: &[Step], out: &mut Vec<FlatStep>) {
    for step in steps {
        match step {
            Step::Configuration(config) => out.push(FlatStep::Configuration(config.clone())),
            Step::Opaque(opaque) => out.push(FlatStep::Opaque(opaque.clone())),
            Step::Nested(spec) => flatten_into(&spec.steps, out),
        }
    }
}
