//! Error types for the auto-inviter.

/// Top-level error type for the invite pipeline.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    /// Startup configuration error (bad flags, missing credentials).
    #[error("config error: {0}")]
    Config(String),

    /// Candidate fetch error (network, timeout, API failure flag).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Invite submission error.
    #[error("invite error: {0}")]
    Invite(String),

    /// Ledger load/persist error.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Cycle log write error.
    #[error("log error: {0}")]
    Log(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, InviteError>;
