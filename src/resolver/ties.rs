//! Tie pairing
//!
//! A tie starting on one note must stop on a later note of the same pitch
//! in the same part and voice, possibly across barlines. Ties are often left
//! dangling on purpose (let-ring, repeats), so problems are warnings.

use std::collections::BTreeMap;

use super::PairingReport;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Locator};
use crate::models::{Element, Event, Tie, TieType};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TieKey {
    part_index: Option<usize>,
    voice: String,
    pitch: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TieLedger {
    open: BTreeMap<TieKey, Locator>,
}

impl TieLedger {
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn apply(&mut self, key: TieKey, ties: &[&Tie], at: &Locator, out: &mut Vec<Diagnostic>) {
        // A note both ending one tie and starting the next lists stop first
        let stops = ties.iter().filter(|t| t.kind == TieType::Stop).count();
        let starts = ties.len() - stops;

        for _ in 0..stops {
            if self.open.remove(&key).is_none() {
                out.push(Diagnostic::warning(
                    DiagnosticCode::TieUnmatchedStop,
                    at.clone(),
                    format!("Tie on {} stops without a start", key.pitch),
                ));
            }
        }
        for _ in 0..starts {
            if let Some(previous) = self.open.insert(key.clone(), at.clone()) {
                out.push(unclosed(&key, previous));
            }
        }
    }
}

fn unclosed(key: &TieKey, locator: Locator) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::TieUnclosed,
        locator,
        format!("Tie on {} is never stopped", key.pitch),
    )
}

/// Pair the ties of one measure
///
/// Standalone `<tie>` records apply to the preceding note.
pub fn resolve_ties(
    mut ledger: TieLedger,
    events: &[Event],
    measure: &Locator,
) -> PairingReport<TieLedger> {
    let mut diagnostics = Vec::new();
    let mut last_note: Option<(String, Option<String>)> = None;

    for event in events {
        let at = measure.at_event(event.index);
        match &event.element {
            Element::Note(note) => {
                let pitch = note.content.tie_key();
                last_note = Some((note.voice.clone(), pitch.clone()));
                let Some(pitch) = pitch else { continue };
                if note.ties.is_empty() {
                    continue;
                }
                let key = TieKey {
                    part_index: measure.part_index,
                    voice: note.voice.clone(),
                    pitch,
                };
                let ties: Vec<&Tie> = note.ties.iter().collect();
                ledger.apply(key, &ties, &at.with_voice(note.voice.clone(), Some(note.staff)), &mut diagnostics);
            }
            Element::Tie(tie) => match &last_note {
                Some((voice, Some(pitch))) => {
                    let key = TieKey {
                        part_index: measure.part_index,
                        voice: voice.clone(),
                        pitch: pitch.clone(),
                    };
                    ledger.apply(key, &[tie], &at.with_voice(voice.clone(), None), &mut diagnostics);
                }
                _ => log::debug!("Ignoring tie with no pitched note before it at {}", at),
            },
            Element::Beam(_)
            | Element::Grouping(_)
            | Element::TimeModification(_)
            | Element::Forward(_)
            | Element::Backup(_)
            | Element::InstrumentChange(_)
            | Element::MidiDevice(_)
            | Element::MidiInstrument(_)
            | Element::Unpitched(_)
            | Element::Opus(_)
            | Element::Stem(_)
            | Element::Cue(_) => {}
        }
    }

    PairingReport {
        ledger,
        diagnostics,
    }
}

/// End of document: report dangling tie starts
pub fn close_ties(ledger: TieLedger) -> Vec<Diagnostic> {
    ledger
        .open
        .into_iter()
        .map(|(key, locator)| unclosed(&key, locator))
        .collect()
}
