//! JSON timeline documents -> `TimelineSpec`.
//!
//! ```json
//! {
//!   "initialValues": { "opacity": [0.5], "scale": 2 },
//!   "steps": [
//!     { "opacity": { "to": 0, "duration": 100, "easing": "easeIn" } },
//!     { "translateX": { "to": { "add": 50 } } },
//!     { "steps": [ { "rotate": { "to": 90 } } ] }
//!   ]
//! }
//! ```
//!
//! Notes:
//! - `to` is a number, `{ "add": n }` or `{ "multiply": n }`; when omitted the
//!   property holds its previous value (duration/easing still apply).
//! - `easing` is `linear | ease | easeIn | easeOut | easeInOut` or
//!   `{ "cubicBezier": [x1, y1, x2, y2] }`.
//! - A step object with a `steps` key is a nested timeline.
//! - Initial values accept a bare number or a one-element array.
//! - Unknown property keys follow `CompileConfig::unknown_properties`.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::accumulator::InitialValues;
use crate::config::{CompileConfig, UnknownPropertyPolicy};
use crate::easing::Easing;
use crate::error::{Result, TimelineError};
use crate::property::Property;
use crate::step::{PropertyConfig, Step, StepConfig, Target, TimelineSpec};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawTimeline {
    #[serde(default)]
    steps: Vec<JsonValue>,
    #[serde(default)]
    initial_values: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPropertyConfig {
    #[serde(default)]
    to: Option<RawTarget>,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    easing: Option<RawEasing>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Number(f32),
    Add { add: f32 },
    Multiply { multiply: f32 },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEasing {
    Named(String),
    Bezier {
        #[serde(rename = "cubicBezier")]
        cubic_bezier: [f32; 4],
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSeed {
    Number(f32),
    Single([f32; 1]),
}

/// Parse a timeline document with the default configuration.
pub fn parse_timeline_json(s: &str) -> Result<TimelineSpec> {
    parse_timeline_json_with(s, &CompileConfig::default())
}

pub fn parse_timeline_json_with(s: &str, cfg: &CompileConfig) -> Result<TimelineSpec> {
    let raw: RawTimeline = serde_json::from_str(s)?;
    to_spec(raw, cfg)
}

/// Same as `parse_timeline_json_with` for an already-parsed JSON value.
pub fn timeline_from_value(value: JsonValue, cfg: &CompileConfig) -> Result<TimelineSpec> {
    let raw: RawTimeline = serde_json::from_value(value)?;
    to_spec(raw, cfg)
}

fn to_spec(raw: RawTimeline, cfg: &CompileConfig) -> Result<TimelineSpec> {
    let mut initial_values = InitialValues::new();
    for (key, value) in raw.initial_values {
        let Some(property) = lookup_property(&key, cfg)? else {
            continue;
        };
        let seed = match serde_json::from_value::<RawSeed>(value)
            .map_err(|e| TimelineError::parse(format!("initial value for {key}: {e}")))?
        {
            RawSeed::Number(v) | RawSeed::Single([v]) => v,
        };
        initial_values.set(property, seed);
    }

    let steps = raw
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| to_step(i, step, cfg))
        .collect::<Result<Vec<_>>>()?;

    Ok(TimelineSpec {
        steps,
        initial_values,
    })
}

fn to_step(index: usize, value: JsonValue, cfg: &CompileConfig) -> Result<Step> {
    let JsonValue::Object(obj) = value else {
        return Err(TimelineError::parse(format!(
            "step {index} must be an object"
        )));
    };
    if obj.contains_key("steps") {
        let nested = timeline_from_value(JsonValue::Object(obj), cfg)?;
        return Ok(nested.into());
    }

    let mut step = StepConfig::new();
    for (key, value) in obj {
        let Some(property) = lookup_property(&key, cfg)? else {
            continue;
        };
        let raw: RawPropertyConfig = serde_json::from_value(value)
            .map_err(|e| TimelineError::parse(format!("step {index}, {key}: {e}")))?;
        step.set(property, to_property_config(raw)?);
    }
    Ok(step.into())
}

fn to_property_config(raw: RawPropertyConfig) -> Result<PropertyConfig> {
    let to = match raw.to {
        Some(RawTarget::Number(v)) => Target::Value(v),
        Some(RawTarget::Add { add }) => Target::from_previous(move |v| v + add),
        Some(RawTarget::Multiply { multiply }) => Target::from_previous(move |v| v * multiply),
        None => Target::from_previous(|v| v),
    };
    Ok(PropertyConfig {
        to,
        duration: raw.duration,
        easing: raw.easing.map(to_easing).transpose()?,
    })
}

fn to_easing(raw: RawEasing) -> Result<Easing> {
    match raw {
        RawEasing::Bezier { cubic_bezier } => Ok(Easing::CubicBezier(cubic_bezier)),
        RawEasing::Named(name) => match name.as_str() {
            "linear" => Ok(Easing::Linear),
            "ease" => Ok(Easing::ease()),
            "easeIn" => Ok(Easing::ease_in()),
            "easeOut" => Ok(Easing::ease_out()),
            "easeInOut" => Ok(Easing::ease_in_out()),
            other => Err(TimelineError::parse(format!("unknown easing '{other}'"))),
        },
    }
}

fn lookup_property(key: &str, cfg: &CompileConfig) -> Result<Option<Property>> {
    match Property::from_name(key) {
        Some(p) => Ok(Some(p)),
        None => match cfg.unknown_properties {
            UnknownPropertyPolicy::Reject => Err(TimelineError::UnknownProperty {
                name: key.to_string(),
            }),
            UnknownPropertyPolicy::Ignore => {
                log::warn!("ignoring unknown animatable property '{key}'");
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_config(step: &Step) -> &StepConfig {
        match step {
            Step::Configuration(c) => c,
            other => panic!("expected configuration step, got {other:?}"),
        }
    }

    #[test]
    fn parses_targets_durations_and_easings() {
        let spec = parse_timeline_json(
            r#"{
                "steps": [
                    { "opacity": { "to": 0, "duration": 100, "easing": "easeIn" } },
                    { "translateX": { "to": { "add": 50 } },
                      "scale": { "to": { "multiply": 2 }, "easing": { "cubicBezier": [0.1, 0.2, 0.3, 0.4] } } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.steps.len(), 2);

        let first = only_config(&spec.steps[0]);
        let opacity = first.get(Property::Opacity).unwrap();
        assert_eq!(opacity.to.resolve(Property::Opacity, 1.0), 0.0);
        assert_eq!(opacity.duration, Some(100.0));
        assert!(matches!(opacity.easing, Some(Easing::CubicBezier(_))));

        let second = only_config(&spec.steps[1]);
        let tx = second.get(Property::TranslateX).unwrap();
        assert_eq!(tx.to.resolve(Property::TranslateX, 3.0), 53.0);
        let scale = second.get(Property::Scale).unwrap();
        assert_eq!(scale.to.resolve(Property::Scale, 1.5), 3.0);
        match &scale.easing {
            Some(Easing::CubicBezier(ctrl)) => assert_eq!(*ctrl, [0.1, 0.2, 0.3, 0.4]),
            other => panic!("expected cubic bezier, got {other:?}"),
        }
    }

    #[test]
    fn missing_to_holds_previous_value() {
        let spec = parse_timeline_json(r#"{ "steps": [ { "rotate": { "duration": 10 } } ] }"#)
            .unwrap();
        let rotate = only_config(&spec.steps[0]).get(Property::Rotate).unwrap();
        assert_eq!(rotate.to.resolve(Property::Rotate, 42.0), 42.0);
    }

    #[test]
    fn initial_values_accept_number_or_single_array() {
        let spec = parse_timeline_json(
            r#"{ "initialValues": { "opacity": [0.5], "scale": 2 }, "steps": [] }"#,
        )
        .unwrap();
        assert_eq!(spec.initial_values.get(Property::Opacity), Some(0.5));
        assert_eq!(spec.initial_values.get(Property::Scale), Some(2.0));
        assert_eq!(spec.initial_values.get(Property::Rotate), None);
    }

    #[test]
    fn nested_documents_become_nested_steps() {
        let spec = parse_timeline_json(
            r#"{ "steps": [ { "steps": [ { "rotate": { "to": 90 } } ] } ] }"#,
        )
        .unwrap();
        match &spec.steps[0] {
            Step::Nested(inner) => assert_eq!(inner.steps.len(), 1),
            other => panic!("expected nested step, got {other:?}"),
        }
    }

    #[test]
    fn unknown_properties_follow_policy() {
        let doc = r#"{ "steps": [ { "translateZ": { "to": 1 }, "opacity": { "to": 0 } } ] }"#;
        assert_eq!(
            parse_timeline_json(doc).unwrap_err(),
            TimelineError::UnknownProperty {
                name: "translateZ".into()
            }
        );

        let cfg = CompileConfig {
            unknown_properties: UnknownPropertyPolicy::Ignore,
            ..CompileConfig::default()
        };
        let spec = parse_timeline_json_with(doc, &cfg).unwrap();
        let props: Vec<Property> = only_config(&spec.steps[0]).properties().collect();
        assert_eq!(props, vec![Property::Opacity]);
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        for doc in [
            "{",
            r#"{ "steps": [ 3 ] }"#,
            r#"{ "steps": [ { "opacity": { "to": "zero" } } ] }"#,
            r#"{ "steps": [ { "opacity": { "to": 0, "easing": "bouncy" } } ] }"#,
            r#"{ "steps": [], "extra": true }"#,
        ] {
            assert!(
                matches!(parse_timeline_json(doc), Err(TimelineError::Parse { .. })),
                "expected parse error for {doc}"
            );
        }
    }
}
