use thiserror::Error;

/// A single failed schema expectation, located by its JSON path (e.g. `children[2].id`).
///
/// This is the one "invalid JAG" condition raised by validation. Callers wrap it in
/// [`JagError::InvalidJag`] together with the offending document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {expected}")]
pub struct SchemaViolation {
    pub path: String,
    pub expected: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// An illegal combination of connector settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorViolation {
    #[error("Returns mode '{returns}' is not permitted under execution '{execution}'")]
    Returns { returns: String, execution: String },

    #[error("Operator '{operator}' is not permitted under returns mode '{returns}'")]
    Operator { operator: String, returns: String },

    #[error("Failure policy '{onfail}' is not permitted under execution '{execution}'")]
    OnFail { onfail: String, execution: String },
}

/// Errors raised at the serialization boundary and by library-level operations.
///
/// Structural mutators on an `Activity` never return these; they are no-ops on
/// stale references.
#[derive(Error, Debug, Clone)]
pub enum JagError {
    #[error("Invalid JAG ({violation}) in document {document}")]
    InvalidJag {
        violation: SchemaViolation,
        document: String,
    },

    #[error("'{0}' is not a valid URN")]
    InvalidUrn(String),

    #[error("URN '{current}' is locked and cannot be changed to '{requested}'")]
    UrnLocked { current: String, requested: String },

    #[error(transparent)]
    Connector(#[from] ConnectorViolation),

    #[error("Unknown {family} name '{name}'")]
    UnknownTaxonomyName { family: &'static str, name: String },

    #[error("Activity '{0}' not found in library")]
    ActivityNotFound(String),

    #[error("Activity '{0}' already exists in library")]
    DuplicateUrn(String),

    #[error("Adding '{child_urn}' as a child of '{parent_urn}' would create a cycle")]
    CycleDetected {
        parent_urn: String,
        child_urn: String,
    },

    #[error("Failed to parse JAG JSON: {0}")]
    JsonParseError(String),

    #[error("I/O failure on '{path}': {message}")]
    Io { path: String, message: String },
}

impl JagError {
    /// Wraps a schema violation with the raw JSON it was found in.
    pub fn invalid_jag(violation: SchemaViolation, document: &serde_json::Value) -> Self {
        JagError::InvalidJag {
            violation,
            document: document.to_string(),
        }
    }
}
