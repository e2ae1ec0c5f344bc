//! Time-cursor bookkeeping for one measure
//!
//! MusicXML has a single "current position" per measure that `<note>`,
//! `<forward>` and `<backup>` move. This engine keeps one cursor per
//! (voice, staff) so each voice's reach can be checked at the barline:
//!
//! - the active cursor is the one the last event touched;
//! - switching voices hands the current position to the new cursor;
//! - `reached` is the furthest point a voice's own content got to, and is
//!   what must agree between voices sharing a staff.
//!
//! Nothing carries across a barline; a new engine starts every measure at 0.

use std::collections::BTreeMap;

use crate::diagnostics::{Diagnostic, DiagnosticCode, Locator, Severity};
use crate::models::{CursorSnapshot, Element};

/// Cursor identity within a measure
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CursorKey {
    pub voice: String,
    pub staff: u32,
}

impl CursorKey {
    pub fn new(voice: impl Into<String>, staff: u32) -> Self {
        Self {
            voice: voice.into(),
            staff,
        }
    }
}

impl Default for CursorKey {
    fn default() -> Self {
        Self::new("1", 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorState {
    pub offset: u32,
    pub reached: u32,
    pub degraded: bool,
}

/// Final cursors and diagnostics of one measure
#[derive(Debug, Clone, Default)]
pub struct CursorReport {
    pub cursors: Vec<CursorSnapshot>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct TimeCursorEngine {
    locator: Locator,
    mismatch_severity: Severity,
    cursors: BTreeMap<CursorKey, CursorState>,
    active: CursorKey,
    diagnostics: Vec<Diagnostic>,
}

impl TimeCursorEngine {
    /// Start a measure. `locator` should already point at the measure.
    pub fn new(locator: Locator, mismatch_severity: Severity) -> Self {
        Self {
            locator,
            mismatch_severity,
            cursors: BTreeMap::new(),
            active: CursorKey::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Feed one validated element at `event_index`
    pub fn apply(&mut self, event_index: usize, element: &Element) {
        match element {
            Element::Note(note) => {
                let key = CursorKey::new(note.voice.clone(), note.staff);
                self.advance(key, note.advance());
            }
            Element::Forward(forward) => {
                let key = match (&forward.voice, forward.staff) {
                    (None, None) => self.active.clone(),
                    (voice, staff) => CursorKey::new(
                        voice.clone().unwrap_or_else(|| self.active.voice.clone()),
                        staff.unwrap_or(self.active.staff),
                    ),
                };
                self.advance(key, forward.duration);
            }
            Element::Backup(backup) => self.rewind(event_index, backup.duration),
            Element::Beam(_)
            | Element::Grouping(_)
            | Element::TimeModification(_)
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

    /// Move the cursor of `key` forward by `duration` divisions
    pub fn advance(&mut self, key: CursorKey, duration: u32) {
        let cursor = self.activate(key);
        cursor.offset = cursor.offset.saturating_add(duration);
        cursor.reached = cursor.reached.max(cursor.offset);
    }

    /// Move the active cursor back by `duration` divisions, clamping at 0
    pub fn rewind(&mut self, event_index: usize, duration: u32) {
        let key = self.active.clone();
        let cursor = self.activate(key.clone());

        if duration <= cursor.offset {
            cursor.offset -= duration;
            return;
        }

        let attempted = cursor.offset as i64 - duration as i64;
        cursor.offset = 0;
        cursor.degraded = true;

        log::debug!("Cursor underflow at {} (attempted {})", self.locator, attempted);
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCode::CursorUnderflow,
            self.locator
                .at_event(event_index)
                .with_voice(key.voice, Some(key.staff)),
            format!(
                "Backup of {} divisions moves the cursor to {}; clamped to 0",
                duration, attempted
            ),
        ));
    }

    /// Current offset of `key`, if it has been touched this measure
    pub fn offset(&self, key: &CursorKey) -> Option<u32> {
        self.cursors.get(key).map(|c| c.offset)
    }

    pub fn active(&self) -> &CursorKey {
        &self.active
    }

    /// Close the measure: check voice agreement per staff and hand back the
    /// final cursor states.
    pub fn finish(mut self) -> CursorReport {
        let mut by_staff: BTreeMap<u32, Vec<(&CursorKey, u32)>> = BTreeMap::new();
        for (key, state) in &self.cursors {
            by_staff.entry(key.staff).or_default().push((key, state.reached));
        }

        for (staff, voices) in by_staff {
            if voices.len() < 2 {
                continue;
            }
            let first = voices[0].1;
            if voices.iter().all(|(_, reached)| *reached == first) {
                continue;
            }
            let summary = voices
                .iter()
                .map(|(key, reached)| format!("voice {} reaches {}", key.voice, reached))
                .collect::<Vec<_>>()
                .join(", ");
            self.diagnostics.push(Diagnostic::new(
                self.mismatch_severity,
                DiagnosticCode::MeasureDurationMismatch,
                Locator {
                    staff: Some(staff),
                    ..self.locator.clone()
                },
                format!("Voices on staff {} end at different offsets: {}", staff, summary),
            ));
        }

        let cursors = self
            .cursors
            .into_iter()
            .map(|(key, state)| CursorSnapshot {
                voice: key.voice,
                staff: key.staff,
                offset: state.offset,
                reached: state.reached,
                degraded: state.degraded,
            })
            .collect();

        CursorReport {
            cursors,
            diagnostics: self.diagnostics,
        }
    }

    /// Make `key` the active cursor, handing over the current position
    fn activate(&mut self, key: CursorKey) -> &mut CursorState {
        if key != self.active {
            let position = self.cursors.get(&self.active).map_or(0, |c| c.offset);
            self.active = key.clone();
            self.cursors.entry(key.clone()).or_default().offset = position;
        }
        self.cursors.entry(key).or_default()
    }
}
