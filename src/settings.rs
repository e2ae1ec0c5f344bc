//! Validation settings

use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;
use crate::errors::SettingsError;

/// How far an open beam may extend before it counts as unclosed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamScope {
    /// Every beam must close within its measure
    Measure,
    /// Beams may cross barlines but must close within the part
    Part,
}

/// Configuration options for validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Severity of voices on one staff ending at different offsets
    pub mismatch_severity: Severity,

    pub beam_scope: BeamScope,

    /// Whether to pair tie start/stop across notes
    pub check_ties: bool,

    /// Report unknown instrument sounds as errors instead of warnings
    pub strict_sounds: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            mismatch_severity: Severity::Warning,
            beam_scope: BeamScope::Measure,
            check_ties: true,
            strict_sounds: false,
        }
    }
}

impl ValidationSettings {
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Severity used for unresolved instrument sounds
    pub fn unknown_sound_severity(&self) -> Severity {
        if self.strict_sounds {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}
