//! Index -> value interpolation over a property's committed outputs.
//!
//! Input range is the timeline index `[0, 1, .., n-1]`, output range the
//! committed values. Sampling reads the live driver every time; nothing is
//! cached.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::AngleUnit;
use crate::driver::DriverValue;
use crate::property::Property;

/// How sampled values are presented to the rendering layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Number,
    Angle(AngleUnit),
}

/// A sampled style value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StyleValue {
    Number(f32),
    Angle { value: f32, unit: AngleUnit },
}

impl StyleValue {
    /// Numeric part, without any unit.
    pub fn value(&self) -> f32 {
        match self {
            StyleValue::Number(v) => *v,
            StyleValue::Angle { value, .. } => *value,
        }
    }

    pub fn is_angle(&self) -> bool {
        matches!(self, StyleValue::Angle { .. })
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(v) => write!(f, "{v}"),
            StyleValue::Angle { value, unit } => write!(f, "{value}{unit}"),
        }
    }
}

/// Numbers serialize as JSON numbers, angles as `"90deg"` strings.
impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StyleValue::Number(v) => serializer.serialize_f32(*v),
            StyleValue::Angle { .. } => serializer.collect_str(self),
        }
    }
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Clone, Debug)]
pub struct Interpolation {
    property: Property,
    driver: DriverValue,
    output_range: Vec<f32>,
    format: OutputFormat,
}

impl Interpolation {
    pub fn new(
        property: Property,
        driver: DriverValue,
        output_range: Vec<f32>,
        format: OutputFormat,
    ) -> Self {
        Self {
            property,
            driver,
            output_range,
            format,
        }
    }

    /// Interpolation for a registered property: rotation family gets `unit`.
    pub fn for_property(
        property: Property,
        driver: DriverValue,
        output_range: Vec<f32>,
        unit: AngleUnit,
    ) -> Self {
        let format = if property.is_rotation() {
            OutputFormat::Angle(unit)
        } else {
            OutputFormat::Number
        };
        Self::new(property, driver, output_range, format)
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn driver(&self) -> &DriverValue {
        &self.driver
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Timeline indices `0..n`.
    pub fn input_range(&self) -> Vec<f32> {
        (0..self.output_range.len()).map(|i| i as f32).collect()
    }

    pub fn output_range(&self) -> &[f32] {
        &self.output_range
    }

    /// Table lookup at a driver position.
    ///
    /// Piecewise linear between neighbouring indices; outside `[0, n-1]` the
    /// first/last segment is extended. A one-entry table is constant.
    pub fn value_at(&self, position: f32) -> f32 {
        let out = &self.output_range;
        match out.len() {
            0 => self.property.default_seed(),
            1 => out[0],
            n => {
                let last = n - 1;
                let seg = if position <= 0.0 {
                    0
                } else {
                    (position.floor() as usize).min(last - 1)
                };
                let t = position - seg as f32;
                lerp_f32(out[seg], out[seg + 1], t)
            }
        }
    }

    /// Sample the live driver.
    pub fn sample(&self) -> StyleValue {
        let value = self.value_at(self.driver.get());
        match self.format {
            OutputFormat::Number => StyleValue::Number(value),
            OutputFormat::Angle(unit) => StyleValue::Angle { value, unit },
        }
    }
}
