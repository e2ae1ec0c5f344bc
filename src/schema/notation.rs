//! Note-level schemas: the note itself and everything that hangs off it

use std::collections::BTreeSet;

use serde_json::Value;

use super::fields::RecordReader;
use super::{ValidationError, ValidationProblem};
use crate::models::{
    Beam, BeamValue, Cue, ElementKind, Fan, Note, NoteContent, NoteTypeValue, Pitch, Step, Stem,
    StemValue, Tie, TieType, TimeModification, Unpitched, MAX_BEAM_LEVEL,
};

/// Validate a `<beam>` record
pub fn beam(raw: &Value) -> Result<Beam, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Beam, raw)?;

    // MusicXML writes hooks with a space ("forward hook")
    let value = r
        .required_string("value")
        .and_then(|text| r.parse_keyword::<BeamValue>("value", &text.replace(' ', "-")));
    let level = r.integer("number", 1, MAX_BEAM_LEVEL as i64).unwrap_or(1) as u8;
    let repeater = r.flag("repeater");
    let fan = r.keyword::<Fan>("fan");
    let color = r.color("color");

    match value {
        Some(value) => r.finish(Beam {
            value,
            level,
            repeater,
            fan,
            color,
        }),
        None => r.reject(),
    }
}

/// Validate a `<time-modification>` record
pub fn time_modification(raw: &Value) -> Result<TimeModification, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::TimeModification, raw)?;

    let actual_notes = r.required_integer("actualNotes", 1, u32::MAX as i64);
    let normal_notes = r.required_integer("normalNotes", 1, u32::MAX as i64);
    let normal_type = r.keyword::<NoteTypeValue>("normalType");
    let normal_dots = r.integer("normalDots", 0, u32::MAX as i64).unwrap_or(0) as u32;

    if normal_dots > 0 && r.raw("normalType").is_none() {
        r.report("normalDots", ValidationProblem::Conflict { with: "normalType".to_string() });
    }

    match (actual_notes, normal_notes) {
        (Some(actual), Some(normal)) => r.finish(TimeModification {
            actual_notes: actual as u32,
            normal_notes: normal as u32,
            normal_type,
            normal_dots,
        }),
        _ => r.reject(),
    }
}

/// Validate a `<pitch>` record
pub fn pitch(raw: &Value) -> Result<Pitch, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Pitch, raw)?;

    let step = r.required_keyword::<Step>("step");
    let alter = r.number("alter", -2.0, 2.0).unwrap_or(0.0);
    let octave = r.required_integer("octave", 0, 9);

    match (step, octave) {
        (Some(step), Some(octave)) => r.finish(Pitch {
            step,
            alter,
            octave: octave as u8,
        }),
        _ => r.reject(),
    }
}

/// Validate an `<unpitched>` record
///
/// Display step and octave are optional but only make sense together.
pub fn unpitched(raw: &Value) -> Result<Unpitched, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Unpitched, raw)?;

    let display_step = r.keyword::<Step>("displayStep");
    let display_octave = r.integer("displayOctave", 0, 9).map(|o| o as u8);

    match (r.raw("displayStep").is_some(), r.raw("displayOctave").is_some()) {
        (true, false) => r.report("displayOctave", ValidationProblem::Missing),
        (false, true) => r.report("displayStep", ValidationProblem::Missing),
        _ => {}
    }

    r.finish(Unpitched {
        display_step,
        display_octave,
    })
}

/// Validate a `<stem>` record
pub fn stem(raw: &Value) -> Result<Stem, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Stem, raw)?;

    let value = r.required_keyword::<StemValue>("value");
    let default_y = r.number("defaultY", f64::MIN, f64::MAX);
    let color = r.color("color");

    match value {
        Some(value) => r.finish(Stem {
            value,
            default_y,
            color,
        }),
        None => r.reject(),
    }
}

/// Validate a `<cue>` marker
pub fn cue(raw: &Value) -> Result<Cue, Vec<ValidationError>> {
    let r = RecordReader::new(ElementKind::Cue, raw)?;
    r.finish(Cue)
}

/// Validate a `<tie>` record
pub fn tie(raw: &Value) -> Result<Tie, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Tie, raw)?;

    let kind = r.required_keyword::<TieType>("type");
    let time_only = r.string("timeOnly");

    match kind {
        Some(kind) => r.finish(Tie { kind, time_only }),
        None => r.reject(),
    }
}

/// Validate a `<note>` record together with its nested children
pub fn note(raw: &Value) -> Result<Note, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Note, raw)?;

    let grace = r.flag("grace");
    let chord = r.flag("chord");
    let rest = r.flag("rest");

    let duration = if grace {
        r.integer("duration", 0, 0)
    } else {
        r.required_integer("duration", 0, u32::MAX as i64)
    };
    let duration = duration.unwrap_or(0) as u32;
    let voice = r.string("voice").unwrap_or_else(|| "1".to_string());
    let staff = r.integer("staff", 1, u32::MAX as i64).unwrap_or(1) as u32;

    let pitch = nested(&mut r, "pitch", pitch);
    let unpitched = nested(&mut r, "unpitched", unpitched);
    let content = match (pitch, unpitched, rest) {
        (Some(pitch), None, false) => Some(NoteContent::Pitch(pitch)),
        (None, Some(unpitched), false) => Some(NoteContent::Unpitched(unpitched)),
        (None, None, true) => Some(NoteContent::Rest),
        (None, None, false) => {
            // Only complain when no content field was given at all;
            // a nested failure is already reported
            if r.raw("pitch").is_none() && r.raw("unpitched").is_none() {
                r.report("pitch", ValidationProblem::Missing);
            }
            None
        }
        _ => {
            r.report(
                "pitch",
                ValidationProblem::Conflict {
                    with: "unpitched/rest".to_string(),
                },
            );
            None
        }
    };

    let cue = nested(&mut r, "cue", cue);
    let stem = nested(&mut r, "stem", stem);
    let time_modification = nested(&mut r, "timeModification", time_modification);

    let mut beams = Vec::new();
    let mut levels = BTreeSet::new();
    for raw_beam in r.list("beams") {
        match beam(raw_beam) {
            Ok(b) => {
                if !levels.insert(b.level) {
                    r.report(
                        "beams",
                        ValidationProblem::Duplicate {
                            value: format!("level {}", b.level),
                        },
                    );
                }
                beams.push(b);
            }
            Err(errors) => r.absorb(errors),
        }
    }

    let mut ties = Vec::new();
    for raw_tie in r.list("ties") {
        match tie(raw_tie) {
            Ok(t) => ties.push(t),
            Err(errors) => r.absorb(errors),
        }
    }

    match content {
        Some(content) => r.finish(Note {
            duration,
            voice,
            staff,
            chord,
            grace,
            content,
            cue,
            stem,
            time_modification,
            beams,
            ties,
        }),
        None => r.reject(),
    }
}

/// Validate an optional nested record with its own schema
fn nested<T>(
    r: &mut RecordReader<'_>,
    field: &str,
    schema: fn(&Value) -> Result<T, Vec<ValidationError>>,
) -> Option<T> {
    let raw = r.raw(field)?;
    match schema(raw) {
        Ok(value) => Some(value),
        Err(errors) => {
            r.absorb(errors);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::Rational64;
    use serde_json::json;

    #[test]
    fn test_beam_defaults_and_hook_spelling() {
        let b = beam(&json!({ "_type": "beam", "value": "forward hook" })).unwrap();
        assert_eq!(b.value, BeamValue::ForwardHook);
        assert_eq!(b.level, 1);
        assert!(!b.repeater);

        let b = beam(&json!({ "value": "end", "number": 3, "fan": "accel", "repeater": "yes" })).unwrap();
        assert_eq!(b.level, 3);
        assert_eq!(b.fan, Some(Fan::Accel));
        assert!(b.repeater);
    }

    #[test]
    fn test_beam_level_out_of_range() {
        let errors = beam(&json!({ "value": "begin", "number": 0 })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "number");
        assert!(matches!(errors[0].problem, ValidationProblem::OutOfRange { .. }));
    }

    #[test]
    fn test_beam_reports_every_problem() {
        let errors = beam(&json!({ "value": "sideways", "number": 12, "color": "blue" })).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["value", "number", "color"]);
    }

    #[test]
    fn test_time_modification_triplet() {
        let tm = time_modification(&json!({ "actualNotes": 3, "normalNotes": 2, "normalType": "eighth" })).unwrap();
        assert_eq!(tm.scale(), Rational64::new(2, 3));
        assert_eq!(tm.normal_type, Some(NoteTypeValue::Eighth));
    }

    #[test]
    fn test_time_modification_rejects_zero() {
        let errors = time_modification(&json!({ "actualNotes": 0, "normalNotes": 2 })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "actualNotes");
        assert!(matches!(errors[0].problem, ValidationProblem::OutOfRange { .. }));
    }

    #[test]
    fn test_time_modification_dots_need_type() {
        let errors = time_modification(&json!({ "actualNotes": 3, "normalNotes": 2, "normalDots": 1 })).unwrap_err();
        assert_eq!(errors[0].field, "normalDots");
    }

    #[test]
    fn test_unpitched_requires_both_display_fields() {
        assert!(unpitched(&json!({})).is_ok());
        assert!(unpitched(&json!({ "displayStep": "E", "displayOctave": 4 })).is_ok());

        let errors = unpitched(&json!({ "displayStep": "E" })).unwrap_err();
        assert_eq!(errors[0].field, "displayOctave");
        assert_eq!(errors[0].problem, ValidationProblem::Missing);
    }

    #[test]
    fn test_stem_values() {
        assert_eq!(stem(&json!({ "value": "double" })).unwrap().value, StemValue::Double);
        assert!(stem(&json!({ "value": "left" })).is_err());
        assert!(stem(&json!({})).is_err());
    }

    #[test]
    fn test_note_with_children() {
        let n = note(&json!({
            "_type": "note",
            "duration": 2,
            "voice": "2",
            "staff": 2,
            "pitch": { "step": "D", "alter": 1, "octave": 5 },
            "stem": { "value": "up" },
            "timeModification": { "actualNotes": 3, "normalNotes": 2 },
            "beams": [ { "value": "begin", "number": 1 }, { "value": "forward hook", "number": 2 } ],
            "ties": [ { "type": "start" } ]
        }))
        .unwrap();

        assert_eq!(n.voice, "2");
        assert_eq!(n.staff, 2);
        assert_eq!(n.beams.len(), 2);
        assert_eq!(n.ties[0].kind, TieType::Start);
        assert!(matches!(n.content, NoteContent::Pitch(ref p) if p.step == Step::D && p.alter == 1.0));
    }

    #[test]
    fn test_note_duplicate_beam_levels() {
        let errors = note(&json!({
            "duration": 1,
            "rest": true,
            "beams": [ { "value": "begin" }, { "value": "end", "number": 1 } ]
        }))
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].problem, ValidationProblem::Duplicate { value: "level 1".to_string() });
    }

    #[test]
    fn test_note_collects_nested_errors() {
        let errors = note(&json!({
            "duration": -1,
            "pitch": { "step": "H", "octave": 4 },
            "beams": [ { "value": "begin", "number": 9 } ]
        }))
        .unwrap_err();

        let elements: Vec<Option<ElementKind>> = errors.iter().map(|e| e.element).collect();
        assert_eq!(
            elements,
            vec![Some(ElementKind::Note), Some(ElementKind::Pitch), Some(ElementKind::Beam)]
        );
    }

    #[test]
    fn test_grace_note_needs_no_duration() {
        let n = note(&json!({ "grace": {}, "pitch": { "step": "C", "octave": 4 } })).unwrap();
        assert!(n.grace);
        assert_eq!(n.advance(), 0);
    }

    #[test]
    fn test_note_content_conflict() {
        let errors = note(&json!({ "duration": 1, "rest": true, "pitch": { "step": "C", "octave": 4 } })).unwrap_err();
        assert!(matches!(errors[0].problem, ValidationProblem::Conflict { .. }));

        let errors = note(&json!({ "duration": 1 })).unwrap_err();
        assert_eq!(errors[0].field, "pitch");
        assert_eq!(errors[0].problem, ValidationProblem::Missing);
    }
}
