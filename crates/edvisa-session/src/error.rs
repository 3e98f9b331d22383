use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no active session")]
    NotAuthenticated,
}

impl SessionError {
    /// Whether the server refused the credentials or token, as opposed to
    /// the request never completing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::Rejected { .. })
    }
}
