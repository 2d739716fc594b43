use std::io::Write;

use client_core::{NavigationController, ScreenName};
use tracing::debug;

use crate::{
    commands::{DraftForm, UserCommand, HELP},
    terminal::TerminalPresenter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes parsed commands into the navigation controller and keeps the draft form in step
/// with the create screen.
pub struct Session<W: Write> {
    controller: NavigationController<TerminalPresenter<W>>,
    draft: DraftForm,
}

impl<W: Write> Session<W> {
    /// Takes a controller that has not been started yet.
    pub fn new(mut controller: NavigationController<TerminalPresenter<W>>) -> Self {
        controller.start();
        Self {
            controller,
            draft: DraftForm::default(),
        }
    }

    pub fn controller(&self) -> &NavigationController<TerminalPresenter<W>> {
        &self.controller
    }

    pub fn prompt(&mut self) {
        self.controller.presenter_mut().prompt();
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match UserCommand::parse(line) {
            Ok(Some(command)) => self.handle(command).await,
            Ok(None) => Flow::Continue,
            Err(err) => {
                self.notice(&err.to_string());
                Flow::Continue
            }
        }
    }

    pub async fn handle(&mut self, command: UserCommand) -> Flow {
        debug!(?command, "user command");
        let screen = self.controller.screen().name();
        match command {
            UserCommand::Quit => return Flow::Quit,
            UserCommand::Help => self.controller.presenter_mut().text(HELP),
            UserCommand::List => {
                if screen == ScreenName::Timeline {
                    self.controller.refresh_timeline();
                } else {
                    self.not_here("list", screen);
                }
            }
            UserCommand::New => {
                if self.controller.open_create() {
                    self.draft = DraftForm::default();
                } else {
                    self.not_here("new", screen);
                }
            }
            UserCommand::Type(raw) => {
                if screen != ScreenName::Create {
                    self.not_here("type", screen);
                } else if self.controller.select_kind(&raw) {
                    if let Ok(kind) = raw.parse() {
                        self.draft.kind = kind;
                    }
                } else {
                    self.notice(&format!("Unknown entry type: {}", raw.trim()));
                }
            }
            UserCommand::Text(text) => self.edit_draft("text", screen, |d| d.text = Some(text)),
            UserCommand::Mood(mood) => self.edit_draft("mood", screen, |d| d.mood = Some(mood)),
            UserCommand::Media(path) => {
                if screen == ScreenName::Create && !self.draft.kind.carries_media() {
                    self.notice("This entry type has no media field");
                } else {
                    self.edit_draft("media", screen, |d| d.media = Some(path));
                }
            }
            UserCommand::Save => self.save(screen).await,
            UserCommand::Cancel => {
                if !self.controller.cancel() {
                    self.not_here("cancel", screen);
                }
            }
            UserCommand::View(n) => self.view(n, screen),
            UserCommand::Back => {
                if !self.controller.back() {
                    self.not_here("back", screen);
                }
            }
        }
        Flow::Continue
    }

    async fn save(&mut self, screen: ScreenName) {
        if screen != ScreenName::Create {
            self.not_here("save", screen);
            return;
        }
        let mut input = self.draft.to_input();
        if !self.draft.kind.carries_media() {
            input.media = None;
        }
        match self.controller.submit(input).await {
            Ok(Some(_)) => self.draft = DraftForm::default(),
            Ok(None) => {}
            Err(err) => self.notice(&err.user_message()),
        }
    }

    fn view(&mut self, n: usize, screen: ScreenName) {
        if screen != ScreenName::Timeline {
            self.not_here("view", screen);
            return;
        }
        let Some(id) = self.controller.presenter().row_id(n).cloned() else {
            self.notice(&format!("No entry number {n} on the timeline"));
            return;
        };
        self.controller.view(&id);
    }

    fn edit_draft(&mut self, field: &str, screen: ScreenName, edit: impl FnOnce(&mut DraftForm)) {
        if screen == ScreenName::Create {
            edit(&mut self.draft);
        } else {
            self.not_here(field, screen);
        }
    }

    fn not_here(&mut self, command: &str, screen: ScreenName) {
        self.notice(&format!("`{command}` is not available on the {screen:?} screen"));
    }

    fn notice(&mut self, message: &str) {
        self.controller.presenter_mut().notice(message);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
