use std::io::{self, Write};

use client_core::{
    EntryDetail, FormVisibility, MediaElement, Presenter, ScreenName, TimelineView, ViewUpdate,
};
use shared::EntryId;
use tracing::warn;

/// Presenter that prints every update as plain text.
///
/// Remembers the ids behind the last drawn timeline so `view <n>` can be resolved.
pub struct TerminalPresenter<W: Write> {
    out: W,
    rows: Vec<EntryId>,
    screen: ScreenName,
    visibility: FormVisibility,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
            screen: ScreenName::Timeline,
            visibility: FormVisibility::for_kind(shared::EntryKind::Text),
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Entry id behind the 1-based timeline row `n`.
    pub fn row_id(&self, n: usize) -> Option<&EntryId> {
        n.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// One-off line outside the screen flow, e.g. a failed save.
    pub fn notice(&mut self, message: &str) {
        self.write_or_warn(|out| writeln!(out, "! {message}"));
    }

    pub fn text(&mut self, text: &str) {
        self.write_or_warn(|out| writeln!(out, "{text}"));
    }

    pub fn prompt(&mut self) {
        let label = match self.screen {
            ScreenName::Timeline => "log",
            ScreenName::Create => "new entry",
            ScreenName::View => "entry",
        };
        self.write_or_warn(|out| {
            write!(out, "{label}> ")?;
            out.flush()
        });
    }

    fn write_or_warn(&mut self, draw: impl FnOnce(&mut W) -> io::Result<()>) {
        if let Err(err) = draw(&mut self.out) {
            warn!(%err, "failed to write to terminal");
        }
    }

    fn draw(&mut self, update: ViewUpdate) -> io::Result<()> {
        match update {
            ViewUpdate::ShowScreen(name) => {
                self.screen = name;
                match name {
                    ScreenName::Timeline => writeln!(self.out, "== Captain's Log =="),
                    ScreenName::Create => {
                        writeln!(self.out, "== New entry ==")?;
                        self.draw_fields()
                    }
                    ScreenName::View => Ok(()),
                }
            }
            ViewUpdate::Timeline(view) => self.draw_timeline(&view),
            ViewUpdate::Entry(detail) => self.draw_entry(&detail),
            ViewUpdate::FormVisibility(visibility) => {
                let changed = visibility != self.visibility;
                self.visibility = visibility;
                if changed && self.screen == ScreenName::Create {
                    self.draw_fields()?;
                }
                Ok(())
            }
        }
    }

    fn draw_timeline(&mut self, view: &TimelineView) -> io::Result<()> {
        self.rows = view.rows().iter().map(|row| row.entry_id.clone()).collect();
        if view.is_empty() {
            return writeln!(self.out, "No entries yet. Type `new` to start your log.");
        }
        for (i, row) in view.rows().iter().enumerate() {
            writeln!(self.out, "{:>3}. {:<12} {}", i + 1, row.title, row.date)?;
        }
        Ok(())
    }

    fn draw_fields(&mut self) -> io::Result<()> {
        let mut fields = vec!["type"];
        if self.visibility.text {
            fields.push("text");
        }
        if self.visibility.media {
            fields.push("media");
        }
        fields.push("mood");
        writeln!(self.out, "Fields: {}", fields.join(", "))
    }

    fn draw_entry(&mut self, detail: &EntryDetail) -> io::Result<()> {
        writeln!(self.out, "== {} ==", detail.title)?;
        writeln!(self.out, "{}", detail.meta)?;
        if let Some(text) = &detail.entry.text_content {
            writeln!(self.out)?;
            writeln!(self.out, "{text}")?;
        }
        if let (Some(element), Some(uri)) = (detail.media, &detail.entry.media_uri) {
            let label = match element {
                MediaElement::Image => "image",
                MediaElement::Audio => "audio",
                MediaElement::Video => "video",
            };
            writeln!(
                self.out,
                "[{label}] {} ({} chars inline)",
                media_type(uri),
                uri.len()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, update: ViewUpdate) {
        if let Err(err) = self.draw(update) {
            warn!(%err, "failed to write to terminal");
        }
    }
}

fn media_type(uri: &str) -> &str {
    uri.strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|mime| !mime.is_empty())
        .unwrap_or("unknown")
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
