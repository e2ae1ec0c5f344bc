//! Element schemas
//!
//! Each schema turns one raw token record into a typed [`Element`] or the
//! full list of field problems found in it. Schemas are pure: they never
//! look at sibling records or shared state.

mod fields;
mod grouping;
mod instruments;
mod movement;
mod notation;
mod opus;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Element, ElementKind, Keyword};

pub use grouping::grouping;
pub use instruments::{instrument_change, midi_device, midi_instrument};
pub use movement::{backup, forward};
pub use notation::{beam, cue, note, pitch, stem, tie, time_modification, unpitched};
pub use opus::opus;

/// Field name carrying the kind discriminator
pub const TYPE_FIELD: &str = "_type";

/// What is wrong with a field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "problem", rename_all = "kebab-case")]
pub enum ValidationProblem {
    #[error("is required")]
    Missing,

    #[error("must be {expected}")]
    WrongType { expected: &'static str },

    #[error("value {value} is outside {min}..={max}")]
    OutOfRange { value: String, min: String, max: String },

    #[error("has unknown value `{value}` (expected one of {})", .allowed.join(", "))]
    UnknownValue {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("conflicts with `{with}`")]
    Conflict { with: String },

    #[error("repeats `{value}`")]
    Duplicate { value: String },
}

/// A field-level violation, tagged with the element kind and field name
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}: field `{field}` {problem}", .element.map_or("element", |k| k.as_keyword()))]
pub struct ValidationError {
    /// `None` when the discriminator itself is missing or unknown
    pub element: Option<ElementKind>,
    pub field: String,
    pub problem: ValidationProblem,
}

impl ValidationError {
    pub fn new(element: Option<ElementKind>, field: &str, problem: ValidationProblem) -> Self {
        Self {
            element,
            field: field.to_string(),
            problem,
        }
    }
}

/// Read the `_type` discriminator of a raw record
pub fn element_kind(raw: &Value) -> Result<ElementKind, ValidationError> {
    let tag = raw.get(TYPE_FIELD).and_then(Value::as_str);
    match tag {
        None => Err(ValidationError::new(None, TYPE_FIELD, ValidationProblem::Missing)),
        Some(text) => ElementKind::from_keyword(text).ok_or_else(|| {
            ValidationError::new(
                None,
                TYPE_FIELD,
                ValidationProblem::UnknownValue {
                    value: text.to_string(),
                    allowed: ElementKind::ALLOWED,
                },
            )
        }),
    }
}

/// Validate any record by dispatching on its `_type`
pub fn validate(raw: &Value) -> Result<Element, Vec<ValidationError>> {
    let kind = element_kind(raw).map_err(|e| vec![e])?;
    match kind {
        ElementKind::Note => note(raw).map(Element::Note),
        ElementKind::Beam => beam(raw).map(Element::Beam),
        ElementKind::Grouping => grouping(raw).map(Element::Grouping),
        ElementKind::TimeModification => time_modification(raw).map(Element::TimeModification),
        ElementKind::Forward => forward(raw).map(Element::Forward),
        ElementKind::Backup => backup(raw).map(Element::Backup),
        ElementKind::InstrumentChange => instrument_change(raw).map(Element::InstrumentChange),
        ElementKind::MidiDevice => midi_device(raw).map(Element::MidiDevice),
        ElementKind::MidiInstrument => midi_instrument(raw).map(Element::MidiInstrument),
        ElementKind::Unpitched => unpitched(raw).map(Element::Unpitched),
        ElementKind::Opus => opus(raw).map(Element::Opus),
        ElementKind::Stem => stem(raw).map(Element::Stem),
        ElementKind::Cue => cue(raw).map(Element::Cue),
        ElementKind::Tie => tie(raw).map(Element::Tie),
        // A bare pitch is only meaningful inside a note
        ElementKind::Pitch => Err(vec![ValidationError::new(
            Some(ElementKind::Pitch),
            TYPE_FIELD,
            ValidationProblem::Conflict {
                with: "note".to_string(),
            },
        )]),
    }
}
