use chrono::{DateTime, FixedOffset, Local, Utc};
use shared::{Entry, EntryId};

/// Medium date plus short time, e.g. `Mar 9, 2024, 6:30 PM`.
const DATE_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Render-ready projection of one entry for the timeline list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub title: String,
    pub date: String,
    pub entry_id: EntryId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineView {
    Empty,
    Rows(Vec<ViewRow>),
}

impl TimelineView {
    pub fn rows(&self) -> &[ViewRow] {
        match self {
            Self::Empty => &[],
            Self::Rows(rows) => rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateZone {
    Fixed(FixedOffset),
    /// Machine zone, resolved per date so daylight-saving shifts are honoured.
    Local,
}

/// Sorts and formats entries for display. Never touches the store.
#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    zone: DateZone,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::local()
    }
}

impl Timeline {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            zone: DateZone::Fixed(offset),
        }
    }

    /// Formats each date with the local offset in force at that instant.
    pub fn local() -> Self {
        Self {
            zone: DateZone::Local,
        }
    }

    /// Rows ordered by `createdAt`, newest first.
    pub fn render(&self, entries: &[Entry]) -> TimelineView {
        if entries.is_empty() {
            return TimelineView::Empty;
        }

        let mut sorted: Vec<&Entry> = entries.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        TimelineView::Rows(
            sorted
                .into_iter()
                .map(|entry| ViewRow {
                    title: entry.title(),
                    date: self.format_date(entry.created_at),
                    entry_id: entry.id.clone(),
                })
                .collect(),
        )
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        match self.zone {
            DateZone::Fixed(offset) => at.with_timezone(&offset).format(DATE_FORMAT).to_string(),
            DateZone::Local => at.with_timezone(&Local).format(DATE_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
#[path = "tests/timeline_tests.rs"]
mod tests;
