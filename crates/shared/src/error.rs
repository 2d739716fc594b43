use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    /// Stored blob is unreadable or malformed. Recovered by starting with no entries.
    #[error("stored entries could not be read: {0}")]
    PersistenceRead(String),

    /// The blob store rejected a write.
    #[error("failed to save entries: {0}")]
    PersistenceWrite(String),

    /// A supplied media asset could not be read.
    #[error("media asset could not be read: {0}")]
    MediaRead(#[from] std::io::Error),

    /// Duration probe failed or was indeterminate. Recovered as "duration unknown".
    #[error("media metadata unavailable: {0}")]
    MediaMetadata(String),

    #[error("unknown entry type: {0}")]
    UnknownKind(String),

    #[error("invalid entry {id}: {reason}")]
    InvalidEntry { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LogError>;

impl LogError {
    /// Short message suitable for showing next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::PersistenceRead(_) => "Saved entries could not be read".to_string(),
            Self::PersistenceWrite(e) => format!("Failed to save: {e}"),
            Self::MediaRead(e) => format!("Could not read media file: {e}"),
            Self::MediaMetadata(_) => "Media duration unknown".to_string(),
            Self::UnknownKind(kind) => format!("Unknown entry type: {kind}"),
            Self::InvalidEntry { reason, .. } => format!("Invalid entry: {reason}"),
        }
    }
}
