// Error taxonomy shared by every collaborator seam (store, profile fetcher,
// purchase executor, command handlers). The dispatcher and the auto-buy loop
// turn these into inline messages; none of them ends the process except
// `Cancelled`, which is the operator asking to leave.

use thiserror::Error;

/// Returned by every suspension point (prompt, acknowledgment, cancellable
/// sleep) once the operator has pressed Ctrl+C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted by operator")]
pub struct Interrupted;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Network trouble or a remote error worth retrying.
    #[error("temporary failure: {0}")]
    Transient(String),

    /// Invalid session/credentials or an identifier the remote side rejected.
    #[error("unrecoverable failure: {0}")]
    Fatal(String),

    /// The operator cancelled while the collaborator was prompting.
    #[error("cancelled by operator")]
    Cancelled,
}

impl CollaboratorError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Classify an HTTP status returned by the gateway. Client errors that
    /// mean "this session or this identifier is no good" are fatal; anything
    /// else may clear up on its own.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let msg = if body.is_empty() {
            status.to_string()
        } else {
            format!("{} - {}", status, body)
        };
        match status.as_u16() {
            400 | 401 | 403 | 404 | 422 => Self::Fatal(msg),
            _ => Self::Transient(msg),
        }
    }
}

impl From<Interrupted> for CollaboratorError {
    fn from(_: Interrupted) -> Self {
        Self::Cancelled
    }
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status, ""),
            None => Self::Transient(err.to_string()),
        }
    }
}
