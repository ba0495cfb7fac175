//! Error taxonomy for the memory engine
//!
//! Errors are modeled as *kinds*, not as one exception type per call site.
//! Background operations (observer ingest, decay, promotion) never propagate
//! errors to a caller — they log and continue. User-initiated operations
//! surface a kind plus a scrubbed, human-readable message.

use std::fmt;

/// Top-level error kind for any engine operation that can fail visibly.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed query, unknown id, invalid parameters.
    #[error("invalid input: {0}")]
    Input(String),

    /// Backing store hiccup (lock contention, transient I/O). Callers may retry.
    #[error("storage temporarily unavailable: {0}")]
    StorageTransient(String),

    /// Corrupt state or schema mismatch. Never auto-retried.
    #[error("storage failure: {0}")]
    StorageFatal(String),

    /// Embedding or rerank provider offline/timed out. Always soft-degraded
    /// before this ever reaches a caller; surfacing it means degradation
    /// itself failed.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A budgeted operation (observer ingest, injection bridge, finalize)
    /// exceeded its soft or hard deadline. Logged, never thrown in practice —
    /// this variant exists so budget overruns can be represented uniformly
    /// when they must cross a fallible boundary (e.g. a test assertion).
    #[error("budget overrun: {0}")]
    BudgetOverrun(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Database errors that typically indicate lock contention rather than
    /// corruption are reclassified as transient so callers know to retry.
    pub fn from_rusqlite_retryable(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::DatabaseBusy
                    || err.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                EngineError::StorageTransient(e.to_string())
            }
            _ => EngineError::StorageFatal(e.to_string()),
        }
    }
}

/// Scrub API keys and bearer tokens out of a message before it leaves the
/// engine. Applied to every user-visible error message.
pub fn scrub_secrets(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    loop {
        let candidates = [
            find_sk_key(rest),
            find_bearer(rest),
            find_token_param(rest),
        ];
        let hit = candidates.into_iter().flatten().min_by_key(|(start, _)| *start);

        match hit {
            Some((start, end)) => {
                out.push_str(&rest[..start]);
                out.push_str("***");
                rest = &rest[end..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

fn find_sk_key(s: &str) -> Option<(usize, usize)> {
    let needle = "sk-";
    let start = s.find(needle)?;
    let body = &s[start + needle.len()..];
    let len = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if len >= 20 {
        Some((start, start + needle.len() + len))
    } else {
        None
    }
}

fn find_bearer(s: &str) -> Option<(usize, usize)> {
    let needle = "Bearer ";
    let start = s.find(needle)?;
    let body = &s[start + needle.len()..];
    let len = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .count();
    if len > 0 {
        Some((start, start + needle.len() + len))
    } else {
        None
    }
}

fn find_token_param(s: &str) -> Option<(usize, usize)> {
    let needle = "token=";
    let start = s.find(needle)?;
    let body = &s[start + needle.len()..];
    let len = body
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '&')
        .count();
    if len > 0 {
        Some((start, start + needle.len() + len))
    } else {
        None
    }
}

impl fmt::Display for ScrubbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", scrub_secrets(&self.0))
    }
}

/// Wraps any displayable error so its `Display` impl is automatically scrubbed.
#[derive(Debug)]
pub struct ScrubbedError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_api_key() {
        let msg = "auth failed with key sk-abcdefghijklmnopqrstuvwx please retry";
        assert!(!scrub_secrets(msg).contains("abcdefghijklmnopqrstuvwx"));
    }

    #[test]
    fn scrubs_bearer_token() {
        let msg = "request failed: Bearer abc123.def456-ghi";
        let scrubbed = scrub_secrets(msg);
        assert!(!scrubbed.contains("abc123.def456-ghi"));
        assert!(scrubbed.contains("***"));
    }

    #[test]
    fn scrubs_token_query_param() {
        let msg = "GET /api?token=supersecretvalue&x=1";
        let scrubbed = scrub_secrets(msg);
        assert!(!scrubbed.contains("supersecretvalue"));
        assert!(scrubbed.contains("&x=1"));
    }

    #[test]
    fn leaves_clean_messages_untouched() {
        let msg = "node not found: abc-123";
        assert_eq!(scrub_secrets(msg), msg);
    }
}
