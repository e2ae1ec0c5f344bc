//! MusicXML notation model
//!
//! Validates an already-tokenized MusicXML score into a typed document and
//! checks it for cross-element consistency: time cursors driven by
//! `<forward>`/`<backup>`, and beam, grouping and tie pairing.
//!
//! ```ignore
//! use musicxml_model::{validate_score, SoundIndex, ValidationSettings};
//!
//! let sounds = SoundIndex::load("sounds.xml")?;
//! let result = validate_score(&tokens, &sounds, &ValidationSettings::default())?;
//! for diagnostic in result.diagnostics.iter() {
//!     println!("{}", diagnostic);
//! }
//! ```

pub mod assembler;
pub mod cursor;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod sounds;

// Re-export commonly used types
pub use assembler::{assemble, validate_score, ValidatedScore};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Locator, Severity};
pub use errors::{FatalError, SettingsError, SoundTableError};
pub use models::*;
pub use schema::{validate, ValidationError, ValidationProblem};
pub use settings::{BeamScope, ValidationSettings};
pub use sounds::SoundIndex;
