//! Instrument and MIDI binding schemas

use serde_json::Value;

use super::fields::RecordReader;
use super::{ValidationError, ValidationProblem};
use crate::models::{
    ElementKind, InstrumentChange, MidiDevice, MidiInstrument, Performers, VirtualInstrument,
};

/// Validate an `<instrument-change>` record
pub fn instrument_change(raw: &Value) -> Result<InstrumentChange, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::InstrumentChange, raw)?;

    let id = r.required_string("id");
    let instrument_sound = r.string("instrumentSound");

    let solo = r.flag("solo");
    let ensemble = r.integer("ensemble", 0, u32::MAX as i64);
    let performers = match (solo, ensemble) {
        (true, Some(_)) => {
            r.report("ensemble", ValidationProblem::Conflict { with: "solo".to_string() });
            None
        }
        (true, None) => Some(Performers::Solo),
        // ensemble size 0 means "unspecified"
        (false, Some(size)) => Some(Performers::Ensemble(size as u32)),
        (false, None) => None,
    };

    let library = r.string("virtualLibrary");
    let name = r.string("virtualName");
    let virtual_instrument = if library.is_some() || name.is_some() {
        Some(VirtualInstrument { library, name })
    } else {
        None
    };

    match id {
        Some(id) => r.finish(InstrumentChange {
            id,
            instrument_sound,
            performers,
            virtual_instrument,
        }),
        None => r.reject(),
    }
}

/// Validate a `<midi-device>` record
pub fn midi_device(raw: &Value) -> Result<MidiDevice, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::MidiDevice, raw)?;

    let id = r.string("id");
    let port = r.integer("port", 1, 16).map(|p| p as u8);
    let name = r.string("name");

    r.finish(MidiDevice { id, port, name })
}

/// Validate a `<midi-instrument>` record
pub fn midi_instrument(raw: &Value) -> Result<MidiInstrument, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::MidiInstrument, raw)?;

    let id = r.required_string("id");
    let channel = r.integer("midiChannel", 1, 16).map(|c| c as u8);
    let name = r.string("midiName");
    let bank = r.integer("midiBank", 1, 16384).map(|b| b as u16);
    let program = r.integer("midiProgram", 1, 128).map(|p| p as u8);
    let unpitched = r.integer("midiUnpitched", 1, 128).map(|k| k as u8);
    let volume = r.number("volume", 0.0, 100.0);
    let pan = r.number("pan", -180.0, 180.0);
    let elevation = r.number("elevation", -180.0, 180.0);

    match id {
        Some(id) => r.finish(MidiInstrument {
            id,
            channel,
            name,
            bank,
            program,
            unpitched,
            volume,
            pan,
            elevation,
        }),
        None => r.reject(),
    }
}
