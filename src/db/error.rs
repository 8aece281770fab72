#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The remote tier is not configured (no Supabase credentials).
    #[error("Remote store is disabled")]
    RemoteDisabled,

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Remote request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Disabled-remote failures are expected and only worth a debug line.
    pub fn is_disabled(&self) -> bool {
        matches!(self, StoreError::RemoteDisabled)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
