use thiserror::Error;

/// Domain errors. The HTTP layer maps `Input` to 400, `Access` to 403 and
/// `Internal` to 500; nothing else ever crosses the API boundary.
#[derive(Debug, Error)]
pub enum LoftError {
    /// Malformed or semantically invalid request content: unknown id,
    /// out-of-range value, duplicate, business-rule violation.
    #[error("{0}")]
    Input(String),

    /// Authentication or authorization failure: invalid session,
    /// insufficient permission.
    #[error("{0}")]
    Access(String),

    /// Infrastructure fault (snapshot persistence, hashing). The in-memory
    /// mutation may already have happened when this is raised.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LoftError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn access(msg: impl Into<String>) -> Self {
        Self::Access(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LoftError>;
