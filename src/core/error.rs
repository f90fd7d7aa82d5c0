use crate::validate::Errors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record type '{0}' not found in catalog")]
    UnknownType(String),

    #[error("Attribute '{0}' collides with an existing attribute on '{1}'")]
    AttributeCollision(String, String),

    #[error("Attribute '{0}' is not delegated and not a column of '{1}'")]
    UnknownAttribute(String, String),

    #[error("Record is invalid: {0}")]
    Invalid(Errors),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Record of type '{0}' was never persisted")]
    NotPersisted(String),

    #[error("Extension save failed after primary save: {source}")]
    ExtensionSaveFailed {
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
