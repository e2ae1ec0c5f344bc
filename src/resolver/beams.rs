//! Beam pairing
//!
//! Per (voice, level) a beam must run `begin (continue)* end`. Hooks are
//! single-note beams and never touch the pairing state.

use std::collections::BTreeMap;

use super::PairingReport;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Locator};
use crate::models::{Beam, BeamValue, Element, Event};

/// Open beams, keyed by (voice, level), with the locator of their `begin`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeamLedger {
    open: BTreeMap<(String, u8), Locator>,
}

impl BeamLedger {
    pub fn is_open(&self, voice: &str, level: u8) -> bool {
        self.open.contains_key(&(voice.to_string(), level))
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    fn apply(&mut self, beam: &Beam, voice: &str, locator: Locator, out: &mut Vec<Diagnostic>) {
        let key = (voice.to_string(), beam.level);
        let locator = locator.with_voice(voice, None);

        match beam.value {
            BeamValue::Begin => {
                if self.open.contains_key(&key) {
                    out.push(Diagnostic::error(
                        DiagnosticCode::BeamReopen,
                        locator,
                        format!("Beam level {} begins while already open", beam.level),
                    ));
                } else {
                    self.open.insert(key, locator);
                }
            }
            BeamValue::Continue => {
                if !self.open.contains_key(&key) {
                    out.push(Diagnostic::error(
                        DiagnosticCode::BeamUnmatchedContinue,
                        locator,
                        format!("Beam level {} continues without a begin", beam.level),
                    ));
                }
            }
            BeamValue::End => {
                if self.open.remove(&key).is_none() {
                    out.push(Diagnostic::error(
                        DiagnosticCode::BeamUnmatchedEnd,
                        locator,
                        format!("Beam level {} ends without a begin", beam.level),
                    ));
                }
            }
            BeamValue::ForwardHook | BeamValue::BackwardHook => {}
        }
    }
}

/// Pair the beams of one measure
///
/// Standalone `<beam>` records belong to the voice of the preceding note.
pub fn resolve_beams(
    mut ledger: BeamLedger,
    events: &[Event],
    measure: &Locator,
) -> PairingReport<BeamLedger> {
    let mut diagnostics = Vec::new();
    let mut voice = "1".to_string();

    for event in events {
        let at = measure.at_event(event.index);
        match &event.element {
            Element::Note(note) => {
                voice = note.voice.clone();
                for beam in &note.beams {
                    ledger.apply(beam, &voice, at.clone(), &mut diagnostics);
                }
            }
            Element::Beam(beam) => ledger.apply(beam, &voice, at, &mut diagnostics),
            Element::Grouping(_)
            | Element::TimeModification(_)
            | Element::Forward(_)
            | Element::Backup(_)
            | Element::InstrumentChange(_)
            | Element::MidiDevice(_)
            | Element::MidiInstrument(_)
            | Element::Unpitched(_)
            | Element::Opus(_)
            | Element::Stem(_)
            | Element::Cue(_)
            | Element::Tie(_) => {}
        }
    }

    PairingReport {
        ledger,
        diagnostics,
    }
}

/// End the beam scope: every beam still open is unclosed
pub fn close_beams(ledger: BeamLedger) -> Vec<Diagnostic> {
    ledger
        .open
        .into_iter()
        .map(|((_, level), locator)| {
            Diagnostic::error(
                DiagnosticCode::BeamUnclosed,
                locator,
                format!("Beam level {} is never ended", level),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::{beamed, events};
    use crate::models::BeamValue::*;

    fn run(elements: Vec<Element>) -> Vec<Diagnostic> {
        let measure = Locator::part(0, None).in_measure(0, None);
        let report = resolve_beams(BeamLedger::default(), &events(elements), &measure);
        let mut diagnostics = report.diagnostics;
        diagnostics.extend(close_beams(report.ledger));
        diagnostics
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_begin_continue_end() {
        let d = run(vec![
            beamed("1", &[(Begin, 1)]),
            beamed("1", &[(Continue, 1)]),
            beamed("1", &[(End, 1)]),
        ]);
        assert!(d.is_empty());
    }

    #[test]
    fn test_begin_end_without_continue() {
        assert!(run(vec![beamed("1", &[(Begin, 1)]), beamed("1", &[(End, 1)])]).is_empty());
    }

    #[test]
    fn test_hooks_need_no_pairing() {
        assert!(run(vec![beamed("1", &[(ForwardHook, 1)])]).is_empty());
        assert!(run(vec![beamed("1", &[(BackwardHook, 2)])]).is_empty());
    }

    #[test]
    fn test_nested_levels() {
        // Eighth + two sixteenths with a secondary beam and a hook
        let d = run(vec![
            beamed("1", &[(Begin, 1)]),
            beamed("1", &[(Continue, 1), (Begin, 2)]),
            beamed("1", &[(Continue, 1), (End, 2)]),
            beamed("1", &[(End, 1), (BackwardHook, 2)]),
        ]);
        assert!(d.is_empty());
    }

    #[test]
    fn test_begin_begin_is_one_reopen() {
        let d = run(vec![
            beamed("1", &[(Begin, 1)]),
            beamed("1", &[(Begin, 1)]),
            beamed("1", &[(End, 1)]),
        ]);
        assert_eq!(codes(&d), vec![DiagnosticCode::BeamReopen]);
        assert_eq!(d[0].locator.event_index, Some(1));
    }

    #[test]
    fn test_begin_begin_alone_also_unclosed() {
        let d = run(vec![beamed("1", &[(Begin, 1)]), beamed("1", &[(Begin, 1)])]);
        assert_eq!(codes(&d), vec![DiagnosticCode::BeamReopen, DiagnosticCode::BeamUnclosed]);
        // Unclosed points at the original begin
        assert_eq!(d[1].locator.event_index, Some(0));
    }

    #[test]
    fn test_unmatched_end_and_continue() {
        let d = run(vec![beamed("1", &[(Continue, 1)]), beamed("1", &[(End, 1)])]);
        assert_eq!(
            codes(&d),
            vec![DiagnosticCode::BeamUnmatchedContinue, DiagnosticCode::BeamUnmatchedEnd]
        );
    }

    #[test]
    fn test_voices_are_independent() {
        let d = run(vec![
            beamed("1", &[(Begin, 1)]),
            beamed("2", &[(Begin, 1)]),
            beamed("1", &[(End, 1)]),
            beamed("2", &[(End, 1)]),
        ]);
        assert!(d.is_empty());
    }

    #[test]
    fn test_standalone_beam_follows_previous_note() {
        let measure = Locator::default();
        let mut elements = vec![beamed("3", &[])];
        elements.push(Element::Beam(Beam {
            value: Begin,
            level: 1,
            repeater: false,
            fan: None,
            color: None,
        }));

        let report = resolve_beams(BeamLedger::default(), &events(elements), &measure);
        assert!(report.ledger.is_open("3", 1));
    }

    #[test]
    fn test_ledger_carries_across_measures() {
        let measure = Locator::default();
        let first = resolve_beams(BeamLedger::default(), &events(vec![beamed("1", &[(Begin, 1)])]), &measure);
        assert!(first.diagnostics.is_empty());
        assert!(!first.ledger.is_empty());

        let second = resolve_beams(first.ledger, &events(vec![beamed("1", &[(End, 1)])]), &measure);
        assert!(second.diagnostics.is_empty());
        assert!(second.ledger.is_empty());
    }
}
