use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown version type: {0}")]
    InvalidType(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Unsafe version id: {0}")]
    UnsafeId(String),

    #[error("Import path escapes the versions root: {0}")]
    UnsafePath(String),

    #[error("Version not found: {id}")]
    NotFound { id: String },

    #[error("No import found for version: {id}")]
    ImportNotFound { id: String },

    #[error("Duplicate version id in registry: {id}")]
    DuplicateId { id: String },

    #[error("Registry parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
