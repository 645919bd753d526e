//! Output accumulator: per-property record of every committed target value.
//!
//! Index `i` of a property's sequence is the timeline index the property's
//! driver sits on after the `i`-th configuration step; index 0 is the seed.

use serde::Serialize;

use crate::error::{Result, TimelineError};
use crate::property::{Property, PropertyMap, ALL_PROPERTIES};

/// Optional per-property overrides of the accumulator seed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InitialValues {
    values: PropertyMap<Option<f32>>,
}

impl InitialValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: Property, value: f32) {
        self.values[property] = Some(value);
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.values[property]
    }

    /// Override if present, else the property's default seed.
    pub fn seed(&self, property: Property) -> f32 {
        self.values[property].unwrap_or_else(|| property.default_seed())
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Option::is_none)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (property, value) in self.values.iter() {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(TimelineError::InvalidInitialValue {
                        property,
                        value: *v,
                    });
                }
            }
        }
        Ok(())
    }
}

/// One ordered sequence of committed values per property.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputAccumulator {
    outputs: PropertyMap<Vec<f32>>,
}

impl OutputAccumulator {
    pub fn seeded(initial: &InitialValues) -> Self {
        Self {
            outputs: PropertyMap::from_fn(|p| vec![initial.seed(p)]),
        }
    }

    /// Last committed value; the "current value" a step resolves against.
    pub fn last(&self, property: Property) -> f32 {
        // Seeded on construction and append-only, so never empty.
        let seq = &self.outputs[property];
        seq[seq.len() - 1]
    }

    /// Append a committed value and return its timeline index.
    pub fn commit(&mut self, property: Property, value: f32) -> usize {
        let seq = &mut self.outputs[property];
        seq.push(value);
        seq.len() - 1
    }

    pub fn values(&self, property: Property) -> &[f32] {
        &self.outputs[property]
    }

    /// Shared sequence length: 1 + committed configuration steps.
    pub fn len(&self) -> usize {
        self.outputs[ALL_PROPERTIES[0]].len()
    }

    /// Always false: every sequence holds at least its seed. Kept alongside
    /// `len` for `clippy::len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest timeline index any driver can reach.
    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &[f32])> {
        self.outputs.iter().map(|(p, v)| (p, v.as_slice()))
    }

    pub(crate) fn is_rectangular(&self) -> bool {
        let n = self.len();
        self.outputs.values().all(|v| v.len() == n)
    }
}
