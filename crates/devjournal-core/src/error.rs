//! Unified error type for devjournal-core.
//!
//! Maps onto the five error kinds every component boundary classifies its failures into:
//! `NotFound`, `Access`, `Schema`, `Query`, `Config`. Nothing in this crate lets an `Error`
//! escape a component boundary uncaught — callers log and degrade instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    Access(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("git error: {0}")]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn access(msg: impl Into<String>) -> Self {
        Error::Access(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Error::Query(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn git(msg: impl Into<String>) -> Self {
        Error::Git(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Per spec §7: `Query` surfaces to callers as `Access` once it crosses a component boundary.
    pub fn as_access(&self) -> String {
        match self {
            Error::Query(msg) => format!("access denied: {msg}"),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::PermissionDenied
                    || err.code == rusqlite::ErrorCode::CannotOpen
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                    || err.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                Error::Access(e.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(e.to_string()),
            // "no such table"/"no such column" means the database is missing a required part
            // of the schema this component depends on, per spec §7 — not a plain query failure.
            other if is_missing_schema_object(&other) => Error::Schema(other.to_string()),
            other => Error::Query(other.to_string()),
        }
    }
}

fn is_missing_schema_object(e: &rusqlite::Error) -> bool {
    let message = e.to_string().to_lowercase();
    message.contains("no such table") || message.contains("no such column")
}

impl From<git2::Error> for Error {
    fn from(e: git2::Error) -> Self {
        Error::Git(e.to_string())
    }
}

/// Redacts anything that looks like an API key before it reaches a log line, per spec §7's
/// "API keys always redacted" policy.
pub fn redact_secret(value: &str) -> String {
    if value.len() <= 8 {
        "***".to_string()
    } else {
        format!("{}...{}", &value[..4], &value[value.len() - 2..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_surfaces_as_access() {
        let err = Error::Query("disk I/O error".into());
        assert!(err.as_access().starts_with("access denied"));
    }

    #[test]
    fn redact_short_secret() {
        assert_eq!(redact_secret("abc"), "***");
    }

    #[test]
    fn redact_long_secret_keeps_ends() {
        let redacted = redact_secret("sk-1234567890abcdef");
        assert!(redacted.starts_with("sk-1"));
        assert!(redacted.ends_with("ef"));
        assert!(!redacted.contains("234567890abcd"));
    }
}
