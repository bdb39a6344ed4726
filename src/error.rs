//! Error types for the comparison pipeline
//!
//! Shape, requirements, and dimension-conflict errors abort a request before
//! any scoring runs. Requirement conflicts are deliberately not here: they are
//! recoverable warnings carried through the pipeline as caveats.

use thiserror::Error;

/// Errors that can occur while building or running a comparison
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefereeError {
    #[error("Invalid request: {0}")]
    InvalidRequestShape(String),

    #[error("Invalid requirements: {0}")]
    InvalidRequirements(String),

    #[error("Unknown technology '{name}'{}", format_suggestions(.suggestions))]
    UnknownTechnology {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Dimension name conflict: {0}")]
    DimensionNameConflict(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Report rendering failed: {0}")]
    Report(String),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::from("; run `referee list` to see known technologies")
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}
