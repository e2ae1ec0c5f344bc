//! Element variants of the notation graph
//!
//! Every record in a measure's token stream validates into exactly one
//! [`Element`]. The enum is closed: the cursor engine, the resolvers and the
//! assembler all match it exhaustively.

use midly::num::{u4, u7};
use num_rational::{Rational32, Rational64};
use serde::Serialize;

keyword_enum! {
    /// `_type` discriminator of a token record.
    pub enum ElementKind {
        Note => "note",
        Beam => "beam",
        Grouping => "grouping",
        TimeModification => "time-modification",
        Forward => "forward",
        Backup => "backup",
        InstrumentChange => "instrument-change",
        MidiDevice => "midi-device",
        MidiInstrument => "midi-instrument",
        Unpitched => "unpitched",
        Opus => "opus",
        Stem => "stem",
        Cue => "cue",
        Tie => "tie",
        Pitch => "pitch",
    }
}

/// A validated token record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_type", rename_all = "kebab-case")]
pub enum Element {
    Note(Note),
    Beam(Beam),
    Grouping(Grouping),
    TimeModification(TimeModification),
    Forward(Forward),
    Backup(Backup),
    InstrumentChange(InstrumentChange),
    MidiDevice(MidiDevice),
    MidiInstrument(MidiInstrument),
    Unpitched(Unpitched),
    Opus(Opus),
    Stem(Stem),
    Cue(Cue),
    Tie(Tie),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Note(_) => ElementKind::Note,
            Element::Beam(_) => ElementKind::Beam,
            Element::Grouping(_) => ElementKind::Grouping,
            Element::TimeModification(_) => ElementKind::TimeModification,
            Element::Forward(_) => ElementKind::Forward,
            Element::Backup(_) => ElementKind::Backup,
            Element::InstrumentChange(_) => ElementKind::InstrumentChange,
            Element::MidiDevice(_) => ElementKind::MidiDevice,
            Element::MidiInstrument(_) => ElementKind::MidiInstrument,
            Element::Unpitched(_) => ElementKind::Unpitched,
            Element::Opus(_) => ElementKind::Opus,
            Element::Stem(_) => ElementKind::Stem,
            Element::Cue(_) => ElementKind::Cue,
            Element::Tie(_) => ElementKind::Tie,
        }
    }
}

// ============================================================================
// BEAMS
// ============================================================================

/// Highest beam level MusicXML allows (1 = eighths ... 8 = 1024ths).
pub const MAX_BEAM_LEVEL: u8 = 8;

keyword_enum! {
    pub enum BeamValue {
        Begin => "begin",
        Continue => "continue",
        End => "end",
        ForwardHook => "forward-hook",
        BackwardHook => "backward-hook",
    }
}

impl BeamValue {
    /// Hooks are partial beams on a single note and never pair.
    pub fn is_hook(self) -> bool {
        matches!(self, BeamValue::ForwardHook | BeamValue::BackwardHook)
    }
}

keyword_enum! {
    pub enum Fan {
        Accel => "accel",
        Rit => "rit",
        None => "none",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beam {
    pub value: BeamValue,
    pub level: u8,
    pub repeater: bool,
    pub fan: Option<Fan>,
    pub color: Option<String>,
}

// ============================================================================
// GROUPINGS
// ============================================================================

keyword_enum! {
    pub enum GroupingType {
        Start => "start",
        Stop => "stop",
        Single => "single",
    }
}

/// Editorial tag carried by a grouping (`<feature type="...">value</feature>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub kind: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grouping {
    pub kind: GroupingType,
    /// Multiplexing key; MusicXML defaults it to "1".
    pub number: String,
    pub member_of: Option<String>,
    pub features: Vec<Feature>,
}

// ============================================================================
// TIME MODIFICATION
// ============================================================================

keyword_enum! {
    /// Graphic note type (`<type>` / `<normal-type>`).
    pub enum NoteTypeValue {
        N1024th => "1024th",
        N512th => "512th",
        N256th => "256th",
        N128th => "128th",
        N64th => "64th",
        N32nd => "32nd",
        N16th => "16th",
        Eighth => "eighth",
        Quarter => "quarter",
        Half => "half",
        Whole => "whole",
        Breve => "breve",
        Long => "long",
        Maxima => "maxima",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeModification {
    pub actual_notes: u32,
    pub normal_notes: u32,
    pub normal_type: Option<NoteTypeValue>,
    pub normal_dots: u32,
}

impl TimeModification {
    /// Playback scaling factor, `normal / actual` (a triplet is 2/3).
    ///
    /// Widened to 64 bits so every `u32` note count is represented exactly.
    pub fn scale(&self) -> Rational64 {
        Rational64::new(i64::from(self.normal_notes), i64::from(self.actual_notes))
    }

    /// Scale a nominal duration to its sounding duration.
    ///
    /// A 32-bit operand times a `u32` count always fits in 64 bits.
    pub fn apply(&self, nominal: Rational32) -> Rational64 {
        let nominal = Rational64::new(i64::from(*nominal.numer()), i64::from(*nominal.denom()));
        nominal * self.scale()
    }
}

// ============================================================================
// FORWARD / BACKUP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forward {
    pub duration: u32,
    pub voice: Option<String>,
    pub staff: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    pub duration: u32,
}

// ============================================================================
// INSTRUMENTS AND MIDI
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performers {
    Solo,
    Ensemble(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualInstrument {
    pub library: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentChange {
    /// `score-instrument` this change applies to.
    pub id: String,
    pub instrument_sound: Option<String>,
    pub performers: Option<Performers>,
    pub virtual_instrument: Option<VirtualInstrument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiDevice {
    pub id: Option<String>,
    /// 1-based port, 1..=16.
    pub port: Option<u8>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiInstrument {
    pub id: String,
    /// 1-based channel, 1..=16.
    pub channel: Option<u8>,
    pub name: Option<String>,
    pub bank: Option<u16>,
    /// 1-based program, 1..=128.
    pub program: Option<u8>,
    /// 1-based key for unpitched percussion, 1..=128.
    pub unpitched: Option<u8>,
    pub volume: Option<f64>,
    pub pan: Option<f64>,
    pub elevation: Option<f64>,
}

/// Zero-based wire values for a MIDI instrument binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiBinding {
    pub channel: u4,
    pub program: Option<u7>,
    pub key: Option<u7>,
}

impl MidiInstrument {
    /// Convert the 1-based markup numbering to wire values.
    ///
    /// Returns `None` when no channel is bound.
    pub fn binding(&self) -> Option<MidiBinding> {
        let channel = self.channel?;
        Some(MidiBinding {
            channel: u4::new(channel.saturating_sub(1)),
            program: self.program.map(|p| u7::new(p.saturating_sub(1))),
            key: self.unpitched.map(|k| u7::new(k.saturating_sub(1))),
        })
    }
}

// ============================================================================
// NOTE CONTENT
// ============================================================================

keyword_enum! {
    pub enum Step {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
        G => "G",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pitch {
    pub step: Step,
    /// Chromatic alteration in semitones; fractional values are microtones.
    pub alter: f64,
    pub octave: u8,
}

impl Pitch {
    /// Identity used to pair ties, e.g. `C+1/4` for C#4.
    pub fn key(&self) -> String {
        // -0.0 and 0.0 are the same alteration
        let alter = self.alter + 0.0;
        format!("{}{:+}/{}", self.step, alter, self.octave)
    }
}

/// Percussion position on the staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unpitched {
    pub display_step: Option<Step>,
    pub display_octave: Option<u8>,
}

impl Unpitched {
    pub fn key(&self) -> String {
        match (self.display_step, self.display_octave) {
            (Some(step), Some(octave)) => format!("unpitched:{}/{}", step, octave),
            _ => "unpitched".to_string(),
        }
    }
}

keyword_enum! {
    pub enum StemValue {
        Up => "up",
        Down => "down",
        Double => "double",
        None => "none",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stem {
    pub value: StemValue,
    pub default_y: Option<f64>,
    pub color: Option<String>,
}

/// Marks a cue-sized note; carries no data of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Cue;

keyword_enum! {
    pub enum TieType {
        Start => "start",
        Stop => "stop",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tie {
    pub kind: TieType,
    pub time_only: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteContent {
    Pitch(Pitch),
    Unpitched(Unpitched),
    Rest,
}

impl NoteContent {
    /// Key for tie pairing; rests have none.
    pub fn tie_key(&self) -> Option<String> {
        match self {
            NoteContent::Pitch(pitch) => Some(pitch.key()),
            NoteContent::Unpitched(unpitched) => Some(unpitched.key()),
            NoteContent::Rest => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// Sounding duration in divisions; zero for grace notes.
    pub duration: u32,
    pub voice: String,
    pub staff: u32,
    /// Shares the onset of the previous note.
    pub chord: bool,
    pub grace: bool,
    pub content: NoteContent,
    pub cue: Option<Cue>,
    pub stem: Option<Stem>,
    pub time_modification: Option<TimeModification>,
    pub beams: Vec<Beam>,
    pub ties: Vec<Tie>,
}

impl Note {
    /// Divisions this note moves the time cursor by.
    pub fn advance(&self) -> u32 {
        if self.chord || self.grace {
            0
        } else {
            self.duration
        }
    }
}

// ============================================================================
// LINKS
// ============================================================================

keyword_enum! {
    pub enum LinkShow {
        New => "new",
        Replace => "replace",
        Embed => "embed",
        Other => "other",
        None => "none",
    }
}

keyword_enum! {
    pub enum LinkActuate {
        OnRequest => "onRequest",
        OnLoad => "onLoad",
        Other => "other",
        None => "none",
    }
}

/// Link from a score to the opus document that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opus {
    pub href: String,
    pub title: Option<String>,
    pub show: Option<LinkShow>,
    pub actuate: Option<LinkActuate>,
}
