//! Import and export error types
//!
//! Every failure in a batch import aborts the whole batch: the transaction that
//! wraps the batch is dropped without commit and nothing becomes visible.
//! Export failures likewise abort the whole export.
//!
//! # Examples
//!
//! ```rust
//! use samply::errors::ImportExportError;
//!
//! let err = ImportExportError::MissingRequiredField("taxid".to_string());
//! assert!(err.is_client_error());
//!
//! let err = ImportExportError::at_line(4, err);
//! assert!(matches!(
//!     err.root_cause(),
//!     ImportExportError::MissingRequiredField(field) if field == "taxid"
//! ));
//! ```

use thiserror::Error;

/// Import and export operation errors
#[derive(Error, Debug)]
pub enum ImportExportError {
    /// A cell could not be parsed (dates, numbers, JSON maps, identifiers)
    #[error("Malformed value {value:?} for field '{field}': {reason}")]
    MalformedField {
        field: String,
        value: String,
        reason: String,
    },

    /// A required column is missing from the header or a required cell is absent
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Enumerated text is not a member of its vocabulary
    #[error("'{term}' is not a valid {vocabulary} term")]
    UnknownVocabularyTerm {
        vocabulary: &'static str,
        term: String,
    },

    /// A hierarchy row names a parent that is neither in the batch nor stored
    #[error("{child} references unknown parent {parent}")]
    DanglingParentReference { child: String, parent: String },

    /// A node is its own parent, or a batch contains a parent cycle
    #[error("Cyclic parent reference involving {0}")]
    CyclicReference(String),

    /// A tree hierarchy ends up with zero or several roots
    #[error("Tree hierarchy must have exactly one root: {0}")]
    MultipleOrMissingRoot(String),

    /// Two rows of one hierarchical batch share a natural key
    #[error("Duplicate natural key in batch: {0}")]
    DuplicateNaturalKey(String),

    /// An association row references an entity that does not exist
    #[error("{entity} '{key}' not found")]
    ReferenceNotFound { entity: &'static str, key: String },

    /// An association row references a natural key matching several entities
    #[error("{entity} '{key}' is ambiguous: {count} matches")]
    AmbiguousReference {
        entity: &'static str,
        key: String,
        count: usize,
    },

    /// The storage layer refused to commit the batch
    #[error("Transaction failed: {0}")]
    TransactionFailure(#[source] sea_orm::DbErr),

    /// Entity type name outside the supported set
    #[error("Unsupported entity type: {0}")]
    UnsupportedEntity(String),

    /// Decode failure annotated with the file line it came from
    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        source: Box<ImportExportError>,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// CSV parsing/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ImportExportResult<T> = Result<T, ImportExportError>;

impl ImportExportError {
    pub fn malformed(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ImportExportError::MalformedField {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn at_line(line: usize, source: ImportExportError) -> Self {
        ImportExportError::AtLine {
            line,
            source: Box::new(source),
        }
    }

    /// The named error underneath any line annotations
    pub fn root_cause(&self) -> &ImportExportError {
        match self {
            ImportExportError::AtLine { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if this error was caused by the input rather than the storage layer
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.root_cause(),
            ImportExportError::MalformedField { .. }
                | ImportExportError::MissingRequiredField(_)
                | ImportExportError::UnknownVocabularyTerm { .. }
                | ImportExportError::DanglingParentReference { .. }
                | ImportExportError::CyclicReference(_)
                | ImportExportError::MultipleOrMissingRoot(_)
                | ImportExportError::DuplicateNaturalKey(_)
                | ImportExportError::ReferenceNotFound { .. }
                | ImportExportError::AmbiguousReference { .. }
                | ImportExportError::UnsupportedEntity(_)
                | ImportExportError::Csv(_)
        )
    }
}
