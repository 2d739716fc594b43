//! Line-oriented input: parses what the user typed into commands and keeps the create form.

use std::path::PathBuf;

use client_core::{EntryInput, MediaBlob};
use shared::EntryKind;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  list                 show the timeline
  new                  start a new entry
  type <kind>          text, image, audio or video
  text <words>         set the entry text
  mood <word>          set the mood (empty clears it)
  media <path>         attach an image, audio or video file
  save | cancel        finish or abandon the entry
  view <n>             open entry number n from the timeline
  back                 return to the timeline
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    List,
    New,
    Type(String),
    Text(String),
    Mood(String),
    Media(PathBuf),
    Save,
    Cancel,
    View(usize),
    Back,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not an entry number")]
    BadIndex(String),
}

impl UserCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" | "timeline" => Self::List,
            "new" => Self::New,
            "type" => Self::Type(required("type", rest)?.to_string()),
            "text" => Self::Text(rest.to_string()),
            "mood" => Self::Mood(rest.to_string()),
            "media" => Self::Media(PathBuf::from(required("media", rest)?)),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "view" | "open" => {
                let raw = required("view", rest)?;
                match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Self::View(n),
                    _ => return Err(CommandError::BadIndex(raw.to_string())),
                }
            }
            "back" => Self::Back,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

/// Field values typed on the create screen, submitted as one [`EntryInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    pub kind: EntryKind,
    pub text: Option<String>,
    pub mood: Option<String>,
    pub media: Option<PathBuf>,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self {
            kind: EntryKind::Text,
            text: None,
            mood: None,
            media: None,
        }
    }
}

impl DraftForm {
    pub fn to_input(&self) -> EntryInput {
        EntryInput {
            kind: self.kind.as_str().to_string(),
            text_content: self.text.clone(),
            mood: self.mood.clone(),
            media: self.media.clone().map(MediaBlob::from_path),
        }
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
