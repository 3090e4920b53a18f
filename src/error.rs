//! Stage-level failures.
//!
//! Each variant aborts one export request and becomes exactly one error
//! payload. Item-level problems never show up here; they are logged and
//! skipped where they happen.

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No local variables found in this document. Please create some variables first.")]
    NoVariables,

    #[error("No variable collections found in this document. Please create some variable collections first.")]
    NoCollections,

    #[error("No tokens could be collected from {variables} variables ({expected} expected). Please check that your variables have values.")]
    NoTokens { variables: usize, expected: usize },

    #[error("No valid collections found after analysis of {tokens} tokens. Please check your variable structure.")]
    NoValidCollections { tokens: usize },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("No files were generated for format: {format}")]
    NoFilesGenerated { format: String },

    #[error("No selected files matched for format {format}: {}", .patterns.join(", "))]
    NothingSelected { format: String, patterns: Vec<String> },

    #[error("invalid file selection pattern '{pattern}'")]
    InvalidSelection {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No local styles found in this document")]
    NoStyles,

    #[error("Styles export not implemented for format: {format}")]
    StylesFormatUnsupported { format: String },

    #[error("Unknown export source: {source_name}")]
    UnknownSource { source_name: String },

    #[error("header template failed to render")]
    Template(#[from] minijinja::Error),

    #[error("document query failed: {what}")]
    Document {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ExportError {
    pub fn document(what: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ExportError::Document { what, source }
    }
}
