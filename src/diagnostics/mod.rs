//! Diagnostics reported while validating a score
//!
//! Every failure short of a missing root container is represented as a
//! [`Diagnostic`] and attached to the result; nothing is thrown across
//! component boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for diagnostics
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warning,
}

/// Kind identifier for a diagnostic
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    // Structural
    MissingRootContainer,
    InvalidContainer,
    InvalidElement,
    // Resolution
    UnknownSound,
    // Cursor
    CursorUnderflow,
    MeasureDurationMismatch,
    // Pairing
    BeamReopen,
    BeamUnmatchedContinue,
    BeamUnmatchedEnd,
    BeamUnclosed,
    GroupingReopen,
    GroupingUnmatchedStop,
    GroupingUnclosed,
    GroupingKeyCollision,
    TieUnmatchedStop,
    TieUnclosed,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiagnosticCode::MissingRootContainer => "missing-root-container",
            DiagnosticCode::InvalidContainer => "invalid-container",
            DiagnosticCode::InvalidElement => "invalid-element",
            DiagnosticCode::UnknownSound => "unknown-sound",
            DiagnosticCode::CursorUnderflow => "cursor-underflow",
            DiagnosticCode::MeasureDurationMismatch => "measure-duration-mismatch",
            DiagnosticCode::BeamReopen => "beam-reopen",
            DiagnosticCode::BeamUnmatchedContinue => "beam-unmatched-continue",
            DiagnosticCode::BeamUnmatchedEnd => "beam-unmatched-end",
            DiagnosticCode::BeamUnclosed => "beam-unclosed",
            DiagnosticCode::GroupingReopen => "grouping-reopen",
            DiagnosticCode::GroupingUnmatchedStop => "grouping-unmatched-stop",
            DiagnosticCode::GroupingUnclosed => "grouping-unclosed",
            DiagnosticCode::GroupingKeyCollision => "grouping-key-collision",
            DiagnosticCode::TieUnmatchedStop => "tie-unmatched-stop",
            DiagnosticCode::TieUnclosed => "tie-unclosed",
        };
        f.write_str(text)
    }
}

/// Where in the score a diagnostic applies
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Locator {
    /// `None` for diagnostics about the document as a whole
    pub part_index: Option<usize>,
    pub part: Option<String>,
    pub measure_index: Option<usize>,
    pub measure_number: Option<String>,
    pub event_index: Option<usize>,
    pub voice: Option<String>,
    pub staff: Option<u32>,
}

impl Locator {
    /// Locator for the score header, outside any part
    pub fn document() -> Self {
        Self::default()
    }

    /// Locator for a whole part
    pub fn part(part_index: usize, part: Option<String>) -> Self {
        Self {
            part_index: Some(part_index),
            part,
            ..Self::default()
        }
    }

    /// Narrow to a measure
    pub fn in_measure(&self, measure_index: usize, measure_number: Option<String>) -> Self {
        Self {
            measure_index: Some(measure_index),
            measure_number,
            event_index: None,
            voice: None,
            staff: None,
            ..self.clone()
        }
    }

    /// Narrow to an event within the measure
    pub fn at_event(&self, event_index: usize) -> Self {
        Self {
            event_index: Some(event_index),
            ..self.clone()
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>, staff: Option<u32>) -> Self {
        self.voice = Some(voice.into());
        self.staff = staff;
        self
    }

    fn sort_key(&self) -> (Option<usize>, usize, usize) {
        (
            self.part_index,
            self.measure_index.unwrap_or(usize::MAX),
            self.event_index.unwrap_or(usize::MAX),
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.part, self.part_index) {
            (Some(id), _) => write!(f, "part {}", id)?,
            (None, Some(index)) => write!(f, "part #{}", index + 1)?,
            (None, None) => f.write_str("document")?,
        }
        if let Some(index) = self.measure_index {
            match &self.measure_number {
                Some(number) => write!(f, ", measure {}", number)?,
                None => write!(f, ", measure #{}", index + 1)?,
            }
        }
        if let Some(event) = self.event_index {
            write!(f, ", event {}", event)?;
        }
        if let Some(voice) = &self.voice {
            write!(f, ", voice {}", voice)?;
        }
        if let Some(staff) = self.staff {
            write!(f, ", staff {}", staff)?;
        }
        Ok(())
    }
}

/// A single reported issue
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub locator: Locator,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        locator: Locator,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            locator,
            message: message.into(),
        }
    }

    pub fn error(code: DiagnosticCode, locator: Locator, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, locator, message)
    }

    pub fn warning(code: DiagnosticCode, locator: Locator, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, locator, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}] {}: {}", severity, self.code, self.locator, self.message)
    }
}

/// Collection of diagnostics for an entire score
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    /// Order by part, measure, then event. The sort is stable, so
    /// diagnostics at the same position keep their reporting order.
    pub fn sort(&mut self) {
        self.items.sort_by_key(|d| d.locator.sort_key());
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|d| matches!(d.severity, Severity::Error | Severity::Fatal))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// All diagnostics carrying `code`
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.items.iter().filter(|d| d.code == code).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let locator = Locator::part(0, Some("P1".to_string()))
            .in_measure(2, Some("3".to_string()))
            .at_event(4)
            .with_voice("1", Some(1));
        let diagnostic = Diagnostic::error(DiagnosticCode::BeamReopen, locator, "Beam level 1 reopened");

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.locator.event_index, Some(4));
        assert_eq!(
            diagnostic.to_string(),
            "error[beam-reopen] part P1, measure 3, event 4, voice 1, staff 1: Beam level 1 reopened"
        );
    }

    #[test]
    fn test_sort_is_deterministic() {
        let part = Locator::part(0, None);
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::warning(DiagnosticCode::TieUnclosed, part.in_measure(1, None).at_event(0), "b"));
        diagnostics.add(Diagnostic::error(DiagnosticCode::BeamUnclosed, part.in_measure(0, None), "c"));
        diagnostics.add(Diagnostic::error(DiagnosticCode::BeamReopen, part.in_measure(0, None).at_event(3), "a"));

        diagnostics.sort();
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_document_locator_sorts_first() {
        let part = Locator::part(0, None);
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::error(DiagnosticCode::BeamUnclosed, part.in_measure(0, None), "measure"));
        diagnostics.add(Diagnostic::error(DiagnosticCode::InvalidContainer, part.clone(), "part"));
        diagnostics.add(Diagnostic::error(DiagnosticCode::InvalidElement, Locator::document(), "header"));

        diagnostics.sort();
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["header", "measure", "part"]);
        assert_eq!(Locator::document().to_string(), "document");
        assert_eq!(part.to_string(), "part #1");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.add(Diagnostic::warning(DiagnosticCode::UnknownSound, Locator::default(), "x"));
        assert!(!diagnostics.has_errors());

        diagnostics.add(Diagnostic::error(DiagnosticCode::InvalidElement, Locator::default(), "y"));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.with_code(DiagnosticCode::UnknownSound).len(), 1);
    }

    #[test]
    fn test_code_serializes_kebab_case() {
        let json = serde_json::to_string(&DiagnosticCode::MeasureDurationMismatch).unwrap();
        assert_eq!(json, "\"measure-duration-mismatch\"");
        assert_eq!(DiagnosticCode::MeasureDurationMismatch.to_string(), "measure-duration-mismatch");
    }
}
