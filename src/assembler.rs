//! Document assembly
//!
//! Runs the whole pipeline over a tokenized score:
//!
//! 1. **Validate**: every record goes through its element schema
//! 2. **Time**: a fresh cursor engine walks each measure
//! 3. **Pair**: beams, groupings and ties are resolved with explicit ledgers
//! 4. **Assemble**: measures and diagnostics are merged into one document
//!
//! Only a missing root container is fatal. Everything else is reported and
//! processing moves on to the next element, measure or part.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cursor::TimeCursorEngine;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Locator};
use crate::errors::FatalError;
use crate::models::{Document, Element, Event, Measure, Opus, Part, SoundBinding};
use crate::resolver::{
    close_beams, close_groupings, close_ties, resolve_beams, resolve_groupings, resolve_ties,
    BeamLedger, GroupingLedger, TieLedger,
};
use crate::schema::{self, TYPE_FIELD};
use crate::settings::{BeamScope, ValidationSettings};
use crate::sounds::SoundIndex;

/// `_type` of the root container
pub const ROOT_TYPE: &str = "score-partwise";

/// A (possibly degraded) document and everything reported while building it
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedScore {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

/// Ledgers that outlive a single part
#[derive(Debug, Default)]
struct DocumentLedgers {
    groupings: GroupingLedger,
    ties: TieLedger,
}

/// Validate and resolve a tokenized score
///
/// # Returns
///
/// * `Ok(ValidatedScore)` - document plus diagnostics (may be non-empty)
/// * `Err(FatalError)` - the root container is missing; no document
pub fn validate_score(
    raw: &Value,
    sounds: &SoundIndex,
    settings: &ValidationSettings,
) -> Result<ValidatedScore, FatalError> {
    let (root, raw_parts) = read_root(raw)?;
    let mut diagnostics = Vec::new();

    let opus = match root.get("opus").filter(|v| !v.is_null()) {
        None => None,
        Some(raw_opus) => match schema::opus(raw_opus) {
            Ok(opus) => Some(opus),
            Err(errors) => {
                diagnostics.extend(invalid_element(&Locator::document(), errors));
                None
            }
        },
    };

    let mut ledgers = DocumentLedgers::default();
    let mut parts = Vec::new();
    for (part_index, raw_part) in raw_parts.iter().enumerate() {
        let (part, part_diagnostics, next) =
            build_part(part_index, raw_part, sounds, settings, ledgers);
        ledgers = next;
        diagnostics.extend(part_diagnostics);
        if let Some(part) = part {
            parts.push(part);
        }
    }

    diagnostics.extend(close_groupings(ledgers.groupings));
    if settings.check_ties {
        diagnostics.extend(close_ties(ledgers.ties));
    }

    Ok(assemble(opus, parts, diagnostics))
}

/// Merge validated parts and collected diagnostics into the final result
///
/// Diagnostics are ordered by part, measure and event regardless of the
/// order in which they were produced.
pub fn assemble(
    opus: Option<Opus>,
    parts: Vec<Part>,
    reports: impl IntoIterator<Item = Diagnostic>,
) -> ValidatedScore {
    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(reports);
    diagnostics.sort();

    let document = Document { opus, parts };
    log::info!(
        "Assembled {} parts / {} measures with {} diagnostics",
        document.parts.len(),
        document.measure_count(),
        diagnostics.len()
    );

    ValidatedScore {
        document,
        diagnostics,
    }
}

/// Check the root container and return its part list
fn read_root(raw: &Value) -> Result<(&Map<String, Value>, &[Value]), FatalError> {
    let root = raw
        .as_object()
        .ok_or_else(|| FatalError::MissingRequiredElement(ROOT_TYPE.to_string()))?;

    match root.get(TYPE_FIELD).and_then(Value::as_str) {
        None => return Err(FatalError::MissingRequiredElement(ROOT_TYPE.to_string())),
        Some(ROOT_TYPE) => {}
        Some(other) => {
            return Err(FatalError::UnsupportedFormat(format!(
                "Expected {}, found {}",
                ROOT_TYPE, other
            )))
        }
    }

    let parts = root
        .get("parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| FatalError::MissingRequiredElement("parts".to_string()))?;

    Ok((root, parts))
}

fn build_part(
    part_index: usize,
    raw: &Value,
    sounds: &SoundIndex,
    settings: &ValidationSettings,
    mut ledgers: DocumentLedgers,
) -> (Option<Part>, Vec<Diagnostic>, DocumentLedgers) {
    let mut diagnostics = Vec::new();

    let Some(map) = raw.as_object() else {
        log::warn!("Skipping part #{}: not an object", part_index + 1);
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::InvalidContainer,
            Locator::part(part_index, None),
            "Part must be an object",
        ));
        return (None, diagnostics, ledgers);
    };

    let id = match map.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let fallback = format!("P{}", part_index + 1);
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidContainer,
                Locator::part(part_index, None),
                format!("Part has no id; using {}", fallback),
            ));
            fallback
        }
    };
    let part_locator = Locator::part(part_index, Some(id.clone()));

    let raw_measures: &[Value] = match map.get("measures") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => {
            log::warn!("Part {} has no measure list", id);
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidContainer,
                part_locator.clone(),
                "Part has no measure list",
            ));
            &[]
        }
    };

    let mut beams = BeamLedger::default();
    let mut measures = Vec::new();
    for (measure_index, raw_measure) in raw_measures.iter().enumerate() {
        let (measure, measure_diagnostics) =
            build_measure(&part_locator, measure_index, raw_measure, sounds, settings);
        diagnostics.extend(measure_diagnostics);

        let locator = part_locator.in_measure(measure_index, measure.number.clone());

        let report = resolve_beams(beams, &measure.events, &locator);
        diagnostics.extend(report.diagnostics);
        beams = report.ledger;
        if settings.beam_scope == BeamScope::Measure {
            diagnostics.extend(close_beams(beams));
            beams = BeamLedger::default();
        }

        let report = resolve_groupings(ledgers.groupings, &measure.events, &locator);
        diagnostics.extend(report.diagnostics);
        ledgers.groupings = report.ledger;

        if settings.check_ties {
            let report = resolve_ties(ledgers.ties, &measure.events, &locator);
            diagnostics.extend(report.diagnostics);
            ledgers.ties = report.ledger;
        }

        measures.push(measure);
    }
    diagnostics.extend(close_beams(beams));

    log::debug!("Part {}: {} measures", id, measures.len());
    (Some(Part { id, measures }), diagnostics, ledgers)
}

/// Validate one measure and run its time cursors
///
/// Touches nothing outside the measure except the read-only sound index.
fn build_measure(
    part_locator: &Locator,
    measure_index: usize,
    raw: &Value,
    sounds: &SoundIndex,
    settings: &ValidationSettings,
) -> (Measure, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let Some(map) = raw.as_object() else {
        log::warn!("Skipping measure #{} of {}: not an object", measure_index + 1, part_locator);
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::InvalidContainer,
            part_locator.in_measure(measure_index, None),
            "Measure must be an object",
        ));
        return (empty_measure(measure_index), diagnostics);
    };

    let number = match map.get("number") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let locator = part_locator.in_measure(measure_index, number.clone());

    let raw_elements: &[Value] = match map.get("elements") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidContainer,
                locator.clone(),
                "Measure elements must be a list",
            ));
            &[]
        }
    };

    let mut engine = TimeCursorEngine::new(locator.clone(), settings.mismatch_severity);
    let mut events = Vec::new();
    let mut bindings = Vec::new();

    for (index, raw_element) in raw_elements.iter().enumerate() {
        let at = locator.at_event(index);
        match schema::validate(raw_element) {
            Ok(element) => {
                engine.apply(index, &element);
                resolve_sound(&element, index, &at, sounds, settings, &mut bindings, &mut diagnostics);
                events.push(Event { index, element });
            }
            Err(errors) => diagnostics.extend(invalid_element(&at, errors)),
        }
    }

    let report = engine.finish();
    diagnostics.extend(report.diagnostics);

    log::debug!("{}: {} events, {} diagnostics", locator, events.len(), diagnostics.len());
    let measure = Measure {
        index: measure_index,
        number,
        events,
        cursors: report.cursors,
        sounds: bindings,
    };
    (measure, diagnostics)
}

fn empty_measure(index: usize) -> Measure {
    Measure {
        index,
        number: None,
        events: Vec::new(),
        cursors: Vec::new(),
        sounds: Vec::new(),
    }
}

/// Bind an instrument change to its sound ordinal
fn resolve_sound(
    element: &Element,
    event_index: usize,
    at: &Locator,
    sounds: &SoundIndex,
    settings: &ValidationSettings,
    bindings: &mut Vec<SoundBinding>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let change = match element {
        Element::InstrumentChange(change) => change,
        Element::Note(_)
        | Element::Beam(_)
        | Element::Grouping(_)
        | Element::TimeModification(_)
        | Element::Forward(_)
        | Element::Backup(_)
        | Element::MidiDevice(_)
        | Element::MidiInstrument(_)
        | Element::Unpitched(_)
        | Element::Opus(_)
        | Element::Stem(_)
        | Element::Cue(_)
        | Element::Tie(_) => return,
    };
    let Some(sound) = &change.instrument_sound else {
        return;
    };

    match sounds.lookup(sound) {
        Some(ordinal) => bindings.push(SoundBinding {
            event_index,
            instrument: change.id.clone(),
            sound: sound.clone(),
            ordinal,
        }),
        None => diagnostics.push(Diagnostic::new(
            settings.unknown_sound_severity(),
            DiagnosticCode::UnknownSound,
            at.clone(),
            format!("Instrument {} uses unknown sound {}", change.id, sound),
        )),
    }
}

fn invalid_element(at: &Locator, errors: Vec<schema::ValidationError>) -> Vec<Diagnostic> {
    errors
        .into_iter()
        .map(|e| Diagnostic::error(DiagnosticCode::InvalidElement, at.clone(), e.to_string()))
        .collect()
}
