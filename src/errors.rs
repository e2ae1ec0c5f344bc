//! Error types
//!
//! Only [`FatalError`] stops assembly. Table and settings errors belong to
//! the loading step that happens before validation starts.

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticCode, Locator, Severity};

/// Structural errors that prevent a document from being produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// Required top-level element is missing
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),

    /// Root container is present but is not a partwise score
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

impl FatalError {
    /// Report the failure in the same shape as every other diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            Severity::Fatal,
            DiagnosticCode::MissingRootContainer,
            Locator::document(),
            self.to_string(),
        )
    }
}

/// Failures while loading the sound reference table
#[derive(Debug, Error)]
pub enum SoundTableError {
    #[error("failed to read sound table: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sound table XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected <sounds> root element, found <{0}>")]
    UnexpectedRoot(String),
}

/// Failures while reading validation settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
