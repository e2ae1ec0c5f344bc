//! Document graph produced by the assembler

use serde::Serialize;

use super::elements::{Element, Opus};

/// Root of the validated output.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Document {
    pub opus: Option<Opus>,
    pub parts: Vec<Part>,
}

impl Document {
    pub fn part(&self, id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub id: String,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    /// Position of the measure within its part.
    pub index: usize,
    /// The `number` attribute as written (may be non-numeric, e.g. "X1").
    pub number: Option<String>,
    pub events: Vec<Event>,
    /// Final cursor state per (voice, staff), ordered by key.
    pub cursors: Vec<CursorSnapshot>,
    pub sounds: Vec<SoundBinding>,
}

impl Measure {
    pub fn cursor(&self, voice: &str, staff: u32) -> Option<&CursorSnapshot> {
        self.cursors
            .iter()
            .find(|c| c.voice == voice && c.staff == staff)
    }
}

/// A validated element at its original position in the token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub index: usize,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorSnapshot {
    pub voice: String,
    pub staff: u32,
    pub offset: u32,
    /// Furthest offset reached by this voice's own content.
    pub reached: u32,
    /// Set once an underflow was clamped.
    pub degraded: bool,
}

/// An instrument change whose sound resolved against the sound index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundBinding {
    pub event_index: usize,
    pub instrument: String,
    pub sound: String,
    pub ordinal: usize,
}
