use super::*;

fn parse(line: &str) -> UserCommand {
    UserCommand::parse(line)
        .expect("valid command")
        .expect("non-blank line")
}

#[test]
fn parses_verbs_and_arguments() {
    assert_eq!(parse("list"), UserCommand::List);
    assert_eq!(parse("  NEW "), UserCommand::New);
    assert_eq!(parse("type Audio"), UserCommand::Type("Audio".into()));
    assert_eq!(
        parse("text  Stardate 41254.7, all quiet "),
        UserCommand::Text("Stardate 41254.7, all quiet".into())
    );
    assert_eq!(parse("mood"), UserCommand::Mood(String::new()));
    assert_eq!(
        parse("media ./clips/bridge log.wav"),
        UserCommand::Media(PathBuf::from("./clips/bridge log.wav"))
    );
    assert_eq!(parse("view 2"), UserCommand::View(2));
    assert_eq!(parse("exit"), UserCommand::Quit);
}

#[test]
fn blank_line_is_not_a_command() {
    assert_eq!(UserCommand::parse("   "), Ok(None));
}

#[test]
fn rejects_bad_input() {
    assert_eq!(
        UserCommand::parse("engage"),
        Err(CommandError::Unknown("engage".into()))
    );
    assert_eq!(
        UserCommand::parse("type"),
        Err(CommandError::MissingArgument("type"))
    );
    assert_eq!(
        UserCommand::parse("view 0"),
        Err(CommandError::BadIndex("0".into()))
    );
    assert_eq!(
        UserCommand::parse("view first"),
        Err(CommandError::BadIndex("first".into()))
    );
}

#[test]
fn draft_becomes_entry_input() {
    let draft = DraftForm {
        kind: EntryKind::Video,
        text: Some("away team".into()),
        mood: None,
        media: Some(PathBuf::from("/tmp/away.mp4")),
    };
    let input = draft.to_input();
    assert_eq!(input.kind, "video");
    assert_eq!(input.text_content.as_deref(), Some("away team"));
    assert_eq!(input.mood, None);
    assert_eq!(input.media, Some(MediaBlob::from_path("/tmp/away.mp4")));

    assert_eq!(DraftForm::default().to_input(), EntryInput::new("text"));
}
