use chrono::{SubsecRound, Utc};
use shared::{Entry, EntryId, EntryKind, Result};
use tracing::info;

use crate::media::{MediaBlob, MediaEncoder};

/// Raw form fields as supplied by the input collaborator on submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    pub kind: String,
    pub text_content: Option<String>,
    pub mood: Option<String>,
    pub media: Option<MediaBlob>,
}

impl EntryInput {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_media(mut self, media: MediaBlob) -> Self {
        self.media = Some(media);
        self
    }
}

pub struct EntryFactory {
    encoder: MediaEncoder,
}

impl Default for EntryFactory {
    fn default() -> Self {
        Self::new(MediaEncoder::default())
    }
}

impl EntryFactory {
    pub fn new(encoder: MediaEncoder) -> Self {
        Self { encoder }
    }

    /// Assembles a complete entry. Media is encoded and then probed before the entry exists;
    /// a media read failure aborts the build and nothing is returned.
    pub async fn build(&self, input: EntryInput) -> Result<Entry> {
        let kind: EntryKind = input.kind.parse()?;
        let id = EntryId::generate();
        let created_at = Utc::now().trunc_subsecs(3);

        let text_content = input
            .text_content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let mood = input.mood.filter(|mood| !mood.is_empty());

        let (media_uri, duration) = if kind.carries_media() {
            let media_uri = self.encoder.encode(input.media.as_ref()).await?;
            let duration = self
                .encoder
                .probe_duration(kind, media_uri.as_deref())
                .await;
            (media_uri, duration)
        } else {
            (None, None)
        };

        info!(
            %id,
            %kind,
            has_media = media_uri.is_some(),
            duration = ?duration,
            "entry built"
        );

        Ok(Entry {
            id,
            created_at,
            kind,
            text_content,
            media_uri,
            duration,
            mood,
        })
    }
}

#[cfg(test)]
#[path = "tests/factory_tests.rs"]
mod tests;
