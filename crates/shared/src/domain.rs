use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LogError, Result};

/// Key under which the whole entry collection is stored.
pub const ENTRIES_STORAGE_KEY: &str = "captains-log-entries";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    Image,
    Audio,
    Video,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [Self::Text, Self::Image, Self::Audio, Self::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Whether entries of this kind may carry an inline media payload.
    pub fn carries_media(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Whether a playback duration is meaningful for this kind.
    pub fn has_duration(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }

    /// Display title used by the timeline and detail screens, e.g. `TEXT entry`.
    pub fn title(self) -> String {
        format!("{} entry", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = LogError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LogError::UnknownKind(raw.to_string()))
    }
}

/// One persisted log record.
///
/// Field names on the wire are fixed (`id`, `createdAt`, `type`, `textContent`, `mediaUri`,
/// `duration`, `mood`); absent values are written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub text_content: Option<String>,
    pub media_uri: Option<String>,
    pub duration: Option<u32>,
    pub mood: Option<String>,
}

impl Entry {
    pub fn title(&self) -> String {
        self.kind.title()
    }

    /// Verifies the type-conditional field rules.
    pub fn check_invariants(&self) -> Result<()> {
        if self.media_uri.is_some() && !self.kind.carries_media() {
            return Err(self.invalid("media payload on a text entry"));
        }
        if self.duration.is_some() && !self.kind.has_duration() {
            return Err(self.invalid(format!("duration on a {} entry", self.kind)));
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> LogError {
        LogError::InvalidEntry {
            id: self.id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Checks every entry's invariants and id uniqueness across the collection.
pub fn check_collection(entries: &[Entry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        entry.check_invariants()?;
        if !seen.insert(&entry.id) {
            return Err(entry.invalid("duplicate id"));
        }
    }
    Ok(())
}

/// `createdAt` is written like `2026-10-18T09:41:00.123Z` and read from any RFC 3339 string.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("invalid createdAt '{raw}': {e}")))
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
