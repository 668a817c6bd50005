use super::SlashCommand;

#[test]
fn it_ignores_plain_text() {
    assert!(SlashCommand::parse("What is your return policy?").is_none());
    assert!(SlashCommand::parse("/unknown").is_none());
    assert!(SlashCommand::parse("   ").is_none());
}

#[test]
fn it_parses_quit() {
    for text in ["/q", "/quit", "/exit"] {
        assert!(SlashCommand::parse(text).unwrap().is_quit());
    }
}

#[test]
fn it_parses_clear() {
    for text in ["/c", "/clear", " /reset "] {
        assert!(SlashCommand::parse(text).unwrap().is_clear());
    }
}

#[test]
fn it_parses_theme() {
    assert!(SlashCommand::parse("/theme").unwrap().is_theme());
    assert!(SlashCommand::parse("/t").unwrap().is_theme());
}

#[test]
fn it_parses_help() {
    assert!(SlashCommand::parse("/help").unwrap().is_help());
}

#[test]
fn it_parses_suggestion_index() {
    let cmd = SlashCommand::parse("/suggest  3").unwrap();
    assert!(cmd.is_suggest());
    assert_eq!(cmd.suggestion_index(), Some(2));
}

#[test]
fn it_rejects_invalid_suggestion_index() {
    assert_eq!(SlashCommand::parse("/s").unwrap().suggestion_index(), None);
    assert_eq!(SlashCommand::parse("/s 0").unwrap().suggestion_index(), None);
    assert_eq!(SlashCommand::parse("/s two").unwrap().suggestion_index(), None);
}
