//! Field access for raw token records
//!
//! A [`RecordReader`] wraps one JSON object and collects every field problem
//! it meets instead of stopping at the first, so one call to a schema
//! reports all of a record's issues.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::{ValidationError, ValidationProblem};
use crate::models::{ElementKind, Keyword};

/// `#RRGGBB` or `#AARRGGBB`
static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}([0-9A-Fa-f]{2})?$").expect("color pattern compiles")
});

pub(crate) struct RecordReader<'a> {
    element: ElementKind,
    map: &'a Map<String, Value>,
    errors: Vec<ValidationError>,
}

impl<'a> RecordReader<'a> {
    pub fn new(element: ElementKind, raw: &'a Value) -> Result<Self, Vec<ValidationError>> {
        match raw.as_object() {
            Some(map) => Ok(Self {
                element,
                map,
                errors: Vec::new(),
            }),
            None => Err(vec![ValidationError::new(
                Some(element),
                "",
                ValidationProblem::WrongType { expected: "an object" },
            )]),
        }
    }

    pub fn report(&mut self, field: &str, problem: ValidationProblem) {
        self.errors
            .push(ValidationError::new(Some(self.element), field, problem));
    }

    /// Fold in the errors of a nested record
    pub fn absorb(&mut self, errors: Vec<ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish<T>(self, value: T) -> Result<T, Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    /// Give up on the record; callers only reach this after a problem was reported
    pub fn reject<T>(self) -> Result<T, Vec<ValidationError>> {
        Err(self.errors)
    }

    /// Raw value of a field; `null` counts as absent
    pub fn raw(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    pub fn string(&mut self, field: &str) -> Option<String> {
        match self.raw(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.report(field, ValidationProblem::WrongType { expected: "a string" });
                None
            }
        }
    }

    pub fn required_string(&mut self, field: &str) -> Option<String> {
        if self.raw(field).is_none() {
            self.report(field, ValidationProblem::Missing);
            return None;
        }
        self.string(field)
    }

    /// Integer in `min..=max`. Digit strings are accepted since markup text
    /// arrives untyped.
    pub fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let value = match self.raw(field)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let Some(value) = value else {
            self.report(field, ValidationProblem::WrongType { expected: "an integer" });
            return None;
        };
        if value < min || value > max {
            self.report(
                field,
                ValidationProblem::OutOfRange {
                    value: value.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                },
            );
            return None;
        }
        Some(value)
    }

    pub fn required_integer(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        if self.raw(field).is_none() {
            self.report(field, ValidationProblem::Missing);
            return None;
        }
        self.integer(field, min, max)
    }

    pub fn number(&mut self, field: &str, min: f64, max: f64) -> Option<f64> {
        let value = match self.raw(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(value) = value.filter(|v| v.is_finite()) else {
            self.report(field, ValidationProblem::WrongType { expected: "a number" });
            return None;
        };
        if value < min || value > max {
            self.report(
                field,
                ValidationProblem::OutOfRange {
                    value: value.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                },
            );
            return None;
        }
        Some(value)
    }

    /// Boolean flag; `yes`/`no` and an empty-element marker (`{}`) count too
    pub fn flag(&mut self, field: &str) -> bool {
        match self.raw(field) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s == "yes" => true,
            Some(Value::String(s)) if s == "no" => false,
            Some(Value::Object(_)) => true,
            Some(_) => {
                self.report(field, ValidationProblem::WrongType { expected: "a boolean" });
                false
            }
        }
    }

    pub fn keyword<K: Keyword>(&mut self, field: &str) -> Option<K> {
        let text = self.string(field)?;
        self.parse_keyword(field, &text)
    }

    pub fn required_keyword<K: Keyword>(&mut self, field: &str) -> Option<K> {
        let text = self.required_string(field)?;
        self.parse_keyword(field, &text)
    }

    pub fn parse_keyword<K: Keyword>(&mut self, field: &str, text: &str) -> Option<K> {
        let parsed = K::from_keyword(text);
        if parsed.is_none() {
            self.report(
                field,
                ValidationProblem::UnknownValue {
                    value: text.to_string(),
                    allowed: K::ALLOWED,
                },
            );
        }
        parsed
    }

    pub fn color(&mut self, field: &str) -> Option<String> {
        let text = self.string(field)?;
        if COLOR.is_match(&text) {
            Some(text)
        } else {
            self.report(field, ValidationProblem::WrongType { expected: "a #RRGGBB or #AARRGGBB color" });
            None
        }
    }

    /// Array field; absent means empty
    pub fn list(&mut self, field: &str) -> &'a [Value] {
        match self.raw(field) {
            None => &[],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                self.report(field, ValidationProblem::WrongType { expected: "a list" });
                &[]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fan;
    use serde_json::json;

    #[test]
    fn test_errors_accumulate() {
        let raw = json!({ "a": "x", "b": 99, "c": "sideways" });
        let mut reader = RecordReader::new(ElementKind::Beam, &raw).unwrap();

        assert_eq!(reader.integer("a", 0, 10), None);
        assert_eq!(reader.integer("b", 0, 10), None);
        assert_eq!(reader.keyword::<Fan>("c"), None);
        assert_eq!(reader.required_string("d"), None);

        let errors = reader.finish(()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[3].problem, ValidationProblem::Missing);
    }

    #[test]
    fn test_numeric_strings_and_nulls() {
        let raw = json!({ "duration": "12", "voice": null, "alter": "-0.5" });
        let mut reader = RecordReader::new(ElementKind::Note, &raw).unwrap();

        assert_eq!(reader.integer("duration", 0, 100), Some(12));
        assert_eq!(reader.string("voice"), None);
        assert_eq!(reader.number("alter", -2.0, 2.0), Some(-0.5));
        assert!(!reader.has_errors());
    }

    #[test]
    fn test_flags() {
        let raw = json!({ "a": true, "b": "no", "c": {}, "d": 3 });
        let mut reader = RecordReader::new(ElementKind::Note, &raw).unwrap();

        assert!(reader.flag("a"));
        assert!(!reader.flag("b"));
        assert!(reader.flag("c"));
        assert!(!reader.flag("missing"));
        assert!(!reader.flag("d"));
        assert!(reader.has_errors());
    }

    #[test]
    fn test_color() {
        let raw = json!({ "ok": "#FF00aa", "argb": "#80FF00AA", "bad": "red" });
        let mut reader = RecordReader::new(ElementKind::Stem, &raw).unwrap();

        assert_eq!(reader.color("ok").as_deref(), Some("#FF00aa"));
        assert!(reader.color("argb").is_some());
        assert_eq!(reader.color("bad"), None);
    }

    #[test]
    fn test_non_object_record() {
        let errors = RecordReader::new(ElementKind::Cue, &json!([1, 2])).err().unwrap();
        assert_eq!(errors.len(), 1);
    }
}
