//! Screen state machine tying creation, listing and viewing together.

use shared::{Entry, EntryId, EntryKind, Result};
use storage::EntryStore;
use tracing::{debug, info, warn};

use crate::{
    factory::{EntryFactory, EntryInput},
    timeline::{Timeline, TimelineView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenName {
    Timeline,
    Create,
    View,
}

/// Which create-form controls are visible for the selected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormVisibility {
    pub text: bool,
    pub media: bool,
}

impl FormVisibility {
    pub fn for_kind(kind: EntryKind) -> Self {
        Self {
            text: true,
            media: kind.carries_media(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateForm {
    pub kind: EntryKind,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            kind: EntryKind::Text,
        }
    }
}

impl CreateForm {
    pub fn visibility(&self) -> FormVisibility {
        FormVisibility::for_kind(self.kind)
    }
}

/// The active screen. Exactly one is active at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Timeline,
    Create(CreateForm),
    View(EntryId),
}

impl Screen {
    pub fn name(&self) -> ScreenName {
        match self {
            Self::Timeline => ScreenName::Timeline,
            Self::Create(_) => ScreenName::Create,
            Self::View(_) => ScreenName::View,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaElement {
    Image,
    Audio,
    Video,
}

impl MediaElement {
    fn for_entry(entry: &Entry) -> Option<Self> {
        if entry.media_uri.is_none() {
            return None;
        }
        match entry.kind {
            EntryKind::Text => None,
            EntryKind::Image => Some(Self::Image),
            EntryKind::Audio => Some(Self::Audio),
            EntryKind::Video => Some(Self::Video),
        }
    }
}

/// Fully resolved entry for the detail screen, including its inline media payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDetail {
    pub title: String,
    /// `Created: ... • Mood: ... • Duration: Ns`, omitting absent parts.
    pub meta: String,
    pub media: Option<MediaElement>,
    pub entry: Entry,
}

impl EntryDetail {
    pub fn new(entry: &Entry, timeline: &Timeline) -> Self {
        let mut meta = vec![format!("Created: {}", timeline.format_date(entry.created_at))];
        if let Some(mood) = entry.mood.as_deref().filter(|m| !m.is_empty()) {
            meta.push(format!("Mood: {mood}"));
        }
        if let Some(duration) = entry.duration.filter(|d| *d > 0) {
            meta.push(format!("Duration: {duration}s"));
        }

        Self {
            title: entry.title(),
            meta: meta.join(" • "),
            media: MediaElement::for_entry(entry),
            entry: entry.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    ShowScreen(ScreenName),
    Timeline(TimelineView),
    Entry(Box<EntryDetail>),
    FormVisibility(FormVisibility),
}

/// Rendering collaborator. Receives everything it draws from the controller.
pub trait Presenter {
    fn present(&mut self, update: ViewUpdate);
}

pub struct NavigationController<P: Presenter> {
    store: EntryStore,
    factory: EntryFactory,
    timeline: Timeline,
    presenter: P,
    screen: Screen,
}

impl<P: Presenter> NavigationController<P> {
    pub fn new(store: EntryStore, factory: EntryFactory, timeline: Timeline, presenter: P) -> Self {
        Self {
            store,
            factory,
            timeline,
            presenter,
            screen: Screen::Timeline,
        }
    }

    /// Draws the initial timeline and primes the create form.
    pub fn start(&mut self) {
        info!(entries = self.store.len(), "starting on timeline");
        self.refresh_timeline();
        self.presenter
            .present(ViewUpdate::FormVisibility(CreateForm::default().visibility()));
        self.switch_to(Screen::Timeline);
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Re-derives the timeline from the store and hands it to the presenter.
    pub fn refresh_timeline(&mut self) {
        let view = self.timeline.render(self.store.all());
        self.presenter.present(ViewUpdate::Timeline(view));
    }

    /// Timeline -> Create, with the form reset to a text entry.
    pub fn open_create(&mut self) -> bool {
        if self.screen != Screen::Timeline {
            return false;
        }
        let form = CreateForm::default();
        self.presenter
            .present(ViewUpdate::FormVisibility(form.visibility()));
        self.switch_to(Screen::Create(form));
        true
    }

    /// Type selector changed while on Create; media controls follow the new type.
    pub fn select_kind(&mut self, raw: &str) -> bool {
        let Screen::Create(form) = &mut self.screen else {
            return false;
        };
        let kind = match raw.parse::<EntryKind>() {
            Ok(kind) => kind,
            Err(err) => {
                warn!(%err, "ignoring type selection");
                return false;
            }
        };
        form.kind = kind;
        let visibility = form.visibility();
        self.presenter.present(ViewUpdate::FormVisibility(visibility));
        true
    }

    /// Builds and stores an entry from the submitted form, then returns to the timeline.
    ///
    /// Returns `Ok(None)` when not on the Create screen. On error the controller stays on
    /// Create and the store is unchanged.
    pub async fn submit(&mut self, input: EntryInput) -> Result<Option<Entry>> {
        if self.screen.name() != ScreenName::Create {
            return Ok(None);
        }

        let entry = self.factory.build(input).await?;
        self.store.add(entry.clone()).await?;
        info!(id = %entry.id, kind = %entry.kind, "entry saved");

        self.refresh_timeline();
        self.presenter
            .present(ViewUpdate::FormVisibility(CreateForm::default().visibility()));
        self.switch_to(Screen::Timeline);
        Ok(Some(entry))
    }

    /// Create -> Timeline without saving.
    pub fn cancel(&mut self) -> bool {
        if self.screen.name() != ScreenName::Create {
            return false;
        }
        self.presenter
            .present(ViewUpdate::FormVisibility(CreateForm::default().visibility()));
        self.switch_to(Screen::Timeline);
        true
    }

    /// Timeline -> View for an existing entry. Unknown ids leave the controller where it is.
    pub fn view(&mut self, id: &EntryId) -> bool {
        if self.screen != Screen::Timeline {
            return false;
        }
        let Some(entry) = self.store.get(id) else {
            debug!(%id, "view requested for unknown entry");
            return false;
        };
        let detail = EntryDetail::new(entry, &self.timeline);
        self.presenter.present(ViewUpdate::Entry(Box::new(detail)));
        self.switch_to(Screen::View(id.clone()));
        true
    }

    /// View -> Timeline, or Create -> Timeline like [`Self::cancel`].
    pub fn back(&mut self) -> bool {
        match self.screen.name() {
            ScreenName::View => {
                self.switch_to(Screen::Timeline);
                true
            }
            ScreenName::Create => self.cancel(),
            ScreenName::Timeline => false,
        }
    }

    fn switch_to(&mut self, screen: Screen) {
        debug!(from = ?self.screen.name(), to = ?screen.name(), "screen transition");
        let name = screen.name();
        self.screen = screen;
        self.presenter.present(ViewUpdate::ShowScreen(name));
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
