//! `<grouping>` schema

use serde_json::Value;

use super::fields::RecordReader;
use super::{ValidationError, ValidationProblem};
use crate::models::{ElementKind, Feature, Grouping, GroupingType};

/// Validate a `<grouping>` record and its `<feature>` children
pub fn grouping(raw: &Value) -> Result<Grouping, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Grouping, raw)?;

    let kind = r.required_keyword::<GroupingType>("type");
    let number = r.string("number").unwrap_or_else(|| "1".to_string());
    let member_of = r.string("memberOf");

    let mut features = Vec::new();
    for raw_feature in r.list("features") {
        match raw_feature {
            Value::String(value) => features.push(Feature {
                kind: None,
                value: value.clone(),
            }),
            Value::Object(map) => {
                let kind = map.get("type").and_then(Value::as_str).map(str::to_string);
                match map.get("value").and_then(Value::as_str) {
                    Some(value) => features.push(Feature {
                        kind,
                        value: value.to_string(),
                    }),
                    None => r.report("features", ValidationProblem::Missing),
                }
            }
            _ => r.report(
                "features",
                ValidationProblem::WrongType {
                    expected: "a list of features",
                },
            ),
        }
    }

    match kind {
        Some(kind) => r.finish(Grouping {
            kind,
            number,
            member_of,
            features,
        }),
        None => r.reject(),
    }
}
