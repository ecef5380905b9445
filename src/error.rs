use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("cannot delete the only tab")]
    LastTab,

    #[error("tab not found: {0}")]
    TabNotFound(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("invalid backup format: {0}")]
    InvalidFormat(String),

    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("stored state is corrupt: {0}")]
    CorruptState(#[source] serde_json::Error),

    #[error("failed to encode deck: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CardError {
    /// Validation and format errors: the operation was rejected and nothing changed.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyField(_)
                | Self::LastTab
                | Self::TabNotFound(_)
                | Self::CardNotFound(_)
                | Self::InvalidFormat(_)
                | Self::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
