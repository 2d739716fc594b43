//! Media ingestion: binary asset -> `data:` URI -> optional playback duration.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::{EntryKind, LogError, Result};
use tracing::debug;

use crate::probe::ContainerProbe;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A media asset handed over by the file picker, either already in memory or on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaBlob {
    Bytes {
        bytes: Vec<u8>,
        mime_type: Option<String>,
        file_name: Option<String>,
    },
    File {
        path: PathBuf,
        mime_type: Option<String>,
    },
}

impl MediaBlob {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, mime_type: Option<String>) -> Self {
        Self::Bytes {
            bytes: bytes.into(),
            mime_type,
            file_name: None,
        }
    }

    /// In-memory asset whose MIME type is guessed from `file_name`.
    pub fn named(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self::Bytes {
            bytes: bytes.into(),
            mime_type: None,
            file_name: Some(file_name.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            mime_type: None,
        }
    }

    /// Declared MIME type, else a guess from the file name, else `application/octet-stream`.
    pub fn mime_type(&self) -> String {
        let (declared, name) = match self {
            Self::Bytes {
                mime_type,
                file_name,
                ..
            } => (mime_type.as_deref(), file_name.as_deref().map(Path::new)),
            Self::File { path, mime_type } => (mime_type.as_deref(), Some(path.as_path())),
        };

        declared
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .map(str::to_string)
            .or_else(|| name.and_then(|name| mime_guess::from_path(name).first_raw().map(str::to_string)))
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
    }

    async fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::Bytes { bytes, .. } => Ok(Cow::Borrowed(bytes.as_slice())),
            Self::File { path, .. } => tokio::fs::read(path).await.map(Cow::Owned).map_err(|e| {
                LogError::MediaRead(std::io::Error::new(
                    e.kind(),
                    format!("{}: {e}", path.display()),
                ))
            }),
        }
    }
}

/// Resolves how long a decoded media payload plays for.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Duration in (possibly fractional) seconds. Fails with [`LogError::MediaMetadata`] when
    /// the payload cannot be understood.
    async fn duration_seconds(&self, mime_type: &str, bytes: &[u8]) -> Result<f64>;
}

pub struct MediaEncoder {
    probe: Arc<dyn MetadataProbe>,
}

impl Default for MediaEncoder {
    fn default() -> Self {
        Self::new(Arc::new(ContainerProbe))
    }
}

impl MediaEncoder {
    pub fn new(probe: Arc<dyn MetadataProbe>) -> Self {
        Self { probe }
    }

    /// Reads `blob` into a self-contained `data:` URI. Absent or zero-length assets yield
    /// `None`; only a failed read is an error.
    pub async fn encode(&self, blob: Option<&MediaBlob>) -> Result<Option<String>> {
        let Some(blob) = blob else {
            return Ok(None);
        };
        let bytes = blob.read().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(to_data_uri(&blob.mime_type(), &bytes)))
    }

    /// Whole-second duration of an audio or video payload. Never fails: anything that keeps
    /// the duration from being known resolves to `None`.
    pub async fn probe_duration(&self, kind: EntryKind, uri: Option<&str>) -> Option<u32> {
        if !kind.has_duration() {
            return None;
        }
        let uri = uri?;

        match self.probe_seconds(uri).await.and_then(round_seconds) {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                debug!(%kind, %err, "media duration unknown");
                None
            }
        }
    }

    async fn probe_seconds(&self, uri: &str) -> Result<f64> {
        let (mime_type, bytes) = parse_data_uri(uri)?;
        self.probe.duration_seconds(&mime_type, &bytes).await
    }
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Splits a base64 `data:` URI into its MIME type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| LogError::MediaMetadata("not a data uri".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LogError::MediaMetadata("data uri has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| LogError::MediaMetadata("data uri is not base64 encoded".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| LogError::MediaMetadata(format!("invalid base64 payload: {e}")))?;

    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME_TYPE
    } else {
        mime_type
    };
    Ok((mime_type.to_string(), bytes))
}

fn round_seconds(seconds: f64) -> Result<u32> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(LogError::MediaMetadata(format!(
            "duration {seconds} is not a finite non-negative number"
        )));
    }
    let rounded = seconds.round();
    if rounded > f64::from(u32::MAX) {
        return Err(LogError::MediaMetadata(format!("duration {seconds} out of range")));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
