//! Integration tests for query construction, the send/reply lifecycle and
//! answer validation

use chrono::{TimeZone, Utc};
use parley_common::query::SELF_MARKER;
use parley_common::{
    Criterion, Error, Filter, Identity, InputMode, Query, QueryRef, QueryStore, Recipient,
    RenderMode, ReplyKind, Result, Value,
};
use std::collections::VecDeque;
use std::fs;
use tempfile::TempDir;

/// Front-end double: keeps what it receives and answers from a script
struct ScriptedFrontend {
    name: String,
    store: QueryStore,
    answers: VecDeque<String>,
}

impl ScriptedFrontend {
    fn new(name: &str, answers: &[&str]) -> Self {
        ScriptedFrontend {
            name: name.to_string(),
            store: QueryStore::new(name),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Identity for ScriptedFrontend {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Recipient for ScriptedFrontend {
    fn receive(&mut self, query: QueryRef) -> Result<()> {
        self.store.store(query);
        Ok(())
    }

    fn execute_queries(&mut self, queries: &[QueryRef]) -> Result<()> {
        for query in queries {
            if let Some(answer) = self.answers.pop_front() {
                query.reply_to(answer)?;
            }
        }
        Ok(())
    }
}

fn number_query() -> Query {
    Query::open("engine", "cli")
        .question("How many bars?")
        .limits([1, 10])
        .build()
        .unwrap()
}

#[test]
fn test_sender_must_differ_from_recipient() {
    let result = Query::open("cli", "cli").question("Title?").build();
    assert!(matches!(result, Err(Error::SameParticipant(name)) if name == "cli"));
}

#[test]
fn test_participants_must_be_known() {
    let result = Query::open("mallory", "cli").question("Title?").build();
    assert!(matches!(result, Err(Error::UnknownParticipant(name)) if name == "mallory"));

    let result = Query::open("engine", "fax").question("Title?").build();
    assert!(matches!(result, Err(Error::UnknownParticipant(name)) if name == "fax"));
}

#[test]
fn test_identifier_depends_only_on_content() {
    let build = |question: &str, limits: &[&str]| {
        Query::single_choice("engine", "bot")
            .foreword("Setup")
            .question(question)
            .afterword("Thanks")
            .limits(limits.iter().copied())
            .build()
            .unwrap()
    };

    let a = build("Mode?", &["a", "b"]);
    let b = build("Mode?", &["a", "b"]);
    assert_eq!(a.identifier(), b.identifier());

    // Sending stamps a time but keeps the identifier
    let shared = QueryRef::new(b);
    let mut bot = ScriptedFrontend::new("bot", &[]);
    shared
        .send_at(&mut bot, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
        .unwrap();
    assert_eq!(shared.identifier(), a.identifier());

    assert_ne!(build("Mode ?", &["a", "b"]).identifier(), a.identifier());
    assert_ne!(build("Mode?", &["a", "c"]).identifier(), a.identifier());

    let other_recipient = Query::single_choice("engine", "web")
        .foreword("Setup")
        .question("Mode?")
        .afterword("Thanks")
        .limits(["a", "b"])
        .build()
        .unwrap();
    assert_ne!(other_recipient.identifier(), a.identifier());

    let prerequisite = Query::open("engine", "bot").question("Name?").build_shared().unwrap();
    let dependent = Query::single_choice("engine", "bot")
        .foreword("Setup")
        .question("Mode?")
        .afterword("Thanks")
        .limits(["a", "b"])
        .prerequisite(&prerequisite)
        .build()
        .unwrap();
    assert_ne!(dependent.identifier(), a.identifier());
}

#[test]
fn test_number_range() {
    let mut query = number_query();
    assert_eq!(query.check_reply(), None);

    assert!(query.reply_to("5").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Integer(5)));

    assert!(!query.reply_to("55").unwrap());
    assert!(!query.reply_to("abc").unwrap());
    assert_eq!(query.reply_result(), None);

    // Blank reads as zero, which is out of range here
    assert!(!query.reply_to("").unwrap());
    assert_eq!(query.reply().unwrap().sanitized(), &Value::from("0"));

    assert!(query.reply_to(" 10 ").unwrap());
    assert!(query.reply_to(Value::Float(1.0)).unwrap());
}

#[test]
fn test_blank_number_without_range_is_zero() {
    let mut query = Query::open("engine", "cli")
        .question("Transpose by?")
        .kind(ReplyKind::Number)
        .build()
        .unwrap();
    assert!(query.reply_to("  ").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Integer(0)));
}

#[test]
fn test_boolean_defaults() {
    let mut query = Query::boolean("engine", "cli").question("Loop playback?").build().unwrap();
    assert_eq!(query.limits(), &[Value::from("y"), Value::from("n")]);

    assert!(query.reply_to("y").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Bool(true)));

    assert!(query.reply_to("N").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Bool(false)));

    assert!(!query.reply_to("maybe").unwrap());
    assert_eq!(query.reply_result(), None);
}

#[test]
fn test_boolean_odd_limits_replaced() {
    let query = Query::boolean("engine", "cli")
        .question("Loop playback?")
        .limits(["yes", "no", "perhaps"])
        .build()
        .unwrap();
    assert_eq!(query.limits(), &[Value::from("y"), Value::from("n")]);

    let mut query = Query::boolean("engine", "cli")
        .question("Loop playback?")
        .limits(["yes", "no", "sure", "nope"])
        .build()
        .unwrap();
    assert!(query.reply_to("sure").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Bool(true)));
    assert!(query.reply_to("3").unwrap());
    assert_eq!(query.reply_result(), Some(Value::Bool(false)));
}

#[test]
fn test_choices_require_limits() {
    let single = Query::single_choice("engine", "cli").question("Pick").build();
    assert!(matches!(single, Err(Error::InvalidLimits { .. })));

    let multiple = Query::multiple_choice("engine", "cli").question("Pick").build();
    assert!(matches!(multiple, Err(Error::InvalidLimits { .. })));
}

#[test]
fn test_single_choice_result() {
    let mut query = Query::single_choice("engine", "cli")
        .question("Enter music as?")
        .limits([InputMode::Notes, InputMode::Chords])
        .build()
        .unwrap();
    assert_eq!(query.display_text(), "Enter music as?\n0) Notes\n1) Chords");

    assert!(query.reply_to("chords").unwrap());
    assert_eq!(query.reply_result(), Some(Value::InputMode(InputMode::Chords)));

    assert!(query.reply_to("0").unwrap());
    assert_eq!(query.reply_result(), Some(Value::InputMode(InputMode::Notes)));

    assert!(!query.reply_to("2").unwrap());
    assert!(!query.reply_to("keys").unwrap());
}

#[test]
fn test_validity_is_idempotent() {
    let mut query = number_query();
    query.reply_to("7").unwrap();
    let first = query.check_reply();
    let second = query.check_reply();
    assert_eq!(first, Some(true));
    assert_eq!(first, second);

    query.reply_to("70").unwrap();
    assert_eq!(query.check_reply(), Some(false));
    assert_eq!(query.check_reply(), Some(false));
}

#[test]
fn test_information_needs_no_reply() {
    let mut query = Query::information("engine", "web")
        .foreword("Rendering starts now.")
        .build()
        .unwrap();
    assert!(!query.expect_reply());
    assert!(query.is_information());
    assert_eq!(query.display_text(), "Rendering starts now.");
    assert!(query.reply_to("ok").unwrap());
}

#[test]
fn test_send_marks_and_forwards() {
    let query = Query::open("engine", "cli").question("Title?").build_shared().unwrap();
    let mut cli = ScriptedFrontend::new("cli", &["Nocturne"]);
    assert!(!query.borrow().is_sent());

    query.send(&mut cli).unwrap();
    assert!(query.borrow().is_sent());
    assert!(query.borrow().sent_time().is_some());
    assert_eq!(cli.store.len(), 1);
    assert!(cli.store.queries()[0].ptr_eq(&query));

    let received = cli
        .store
        .recall(Criterion::All, &[Filter::ToOwner, Filter::Unsatisfied], None);
    cli.execute_queries(&received).unwrap();
    assert!(query.borrow().is_satisfied());
    assert_eq!(query.borrow().reply_result(), Some(Value::from("Nocturne")));
}

#[test]
fn test_resend_clears_invalid_reply_but_refuses_satisfied() {
    let query = QueryRef::new(number_query());
    let mut cli = ScriptedFrontend::new("cli", &[]);

    query.send(&mut cli).unwrap();
    query.reply_to("99").unwrap();
    assert_eq!(query.borrow().check_reply(), Some(false));

    query.send(&mut cli).unwrap();
    assert!(!query.borrow().is_replied());

    query.reply_to("3").unwrap();
    let result = query.send(&mut cli);
    assert!(matches!(result, Err(Error::AlreadySatisfied(_))));
}

#[test]
fn test_send_to_other_recipient_retargets() {
    let query = Query::open("engine", "cli").question("Title?").build_shared().unwrap();
    let before = query.identifier();
    let mut web = ScriptedFrontend::new("web", &[]);
    query.send(&mut web).unwrap();
    assert_eq!(query.borrow().recipient(), "web");
    assert_ne!(query.identifier(), before);

    let mut engine = ScriptedFrontend::new("engine", &[]);
    let fresh = Query::open("engine", "cli").question("Key?").build_shared().unwrap();
    assert!(matches!(fresh.send(&mut engine), Err(Error::SameParticipant(_))));
    assert_eq!(fresh.borrow().recipient(), "cli");
}

#[test]
fn test_prerequisite_must_be_satisfied_first() {
    let mode = Query::single_choice("engine", "cli")
        .question("Enter music as?")
        .limits([InputMode::Notes, InputMode::Chords])
        .build_shared()
        .unwrap();
    let notes = Query::open("engine", "cli")
        .question("Notes?")
        .kind(ReplyKind::Note)
        .prerequisite(&mode)
        .build_shared()
        .unwrap();

    let result = notes.reply_to("c d e");
    assert!(matches!(
        result,
        Err(Error::UnmetPrerequisite { ref prerequisite, .. }) if prerequisite == "Enter music as?"
    ));
    assert!(!notes.borrow().is_replied());

    // An invalid answer is not blocked: it is data, not a sequencing bug
    mode.reply_to("lute").unwrap();
    assert!(notes.reply_to(Value::from(12)).is_ok());
    assert_eq!(notes.borrow().check_reply(), Some(false));

    mode.reply_to("notes").unwrap();
    assert!(notes.reply_to("c d e").unwrap());
}

#[test]
fn test_dependent_identifier_follows_retargeted_prerequisite() {
    let title = Query::open("engine", "cli").question("Title?").build_shared().unwrap();
    let early = Query::open("engine", "cli")
        .question("Subtitle?")
        .prerequisite(&title)
        .build_shared()
        .unwrap();
    let before = early.identifier();

    let mut web = ScriptedFrontend::new("web", &[]);
    title.send(&mut web).unwrap();
    assert_ne!(early.identifier(), before);

    let late = Query::open("engine", "cli")
        .question("Subtitle?")
        .prerequisite(&title)
        .build_shared()
        .unwrap();
    assert_eq!(early.identifier(), late.identifier());
}

#[test]
fn test_dependent_identifier_follows_required_prerequisite() {
    let title = Query::open("engine", "cli").question("Title?").build_shared().unwrap();
    let early = Query::open("engine", "cli")
        .question("Subtitle?")
        .prerequisite(&title)
        .build_shared()
        .unwrap();

    let key = Query::open("engine", "cli").question("Key?").build_shared().unwrap();
    title.require(&key);

    let title_again = Query::open("engine", "cli")
        .question("Title?")
        .prerequisite(&key)
        .build_shared()
        .unwrap();
    let late = Query::open("engine", "cli")
        .question("Subtitle?")
        .prerequisite(&title_again)
        .build_shared()
        .unwrap();
    assert_eq!(title.identifier(), title_again.identifier());
    assert_eq!(early.identifier(), late.identifier());
}

#[test]
fn test_identifier_survives_prerequisite_cycles() {
    let first = Query::open("engine", "cli").question("First?").build_shared().unwrap();
    let second = Query::open("engine", "cli")
        .question("Second?")
        .prerequisite(&first)
        .build_shared()
        .unwrap();
    first.require(&second);
    assert_eq!(first.identifier().len(), 64);
    assert_ne!(first.identifier(), second.identifier());

    let looped = Query::open("engine", "cli").question("Looped?").build_shared().unwrap();
    let before = looped.identifier();
    looped.require(&looped);
    assert_ne!(looped.identifier(), before);
    assert_eq!(looped.identifier(), looped.identifier());
}

#[test]
fn test_own_prerequisite_is_named_apart() {
    let looped = Query::open("engine", "cli")
        .name("looped")
        .question("Looped?")
        .build_shared()
        .unwrap();
    looped.require(&looped);

    let result = looped.reply_to("yes");
    assert!(matches!(
        result,
        Err(Error::UnmetPrerequisite { ref query, ref prerequisite })
            if query == "looped" && prerequisite == SELF_MARKER
    ));
    assert!(!looped.borrow().is_replied());
}

#[test]
fn test_help_sentinel_toggles_help() {
    let mut query = Query::single_choice("engine", "cli")
        .question("Instrument?")
        .help_text("Choose the instrument the chord diagrams are drawn for.")
        .limits(["piano", "guitar"])
        .build()
        .unwrap();

    assert!(!query.reply_to("?").unwrap());
    assert!(query.help_required());
    assert!(query
        .display_text()
        .starts_with("Choose the instrument the chord diagrams are drawn for."));
    assert!(query.reply().unwrap().is_help_request());

    assert!(query.reply_to("guitar").unwrap());
    assert!(query.help_required());
}

#[test]
fn test_file_path_checks() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("song.ly"), "\\relative c' { c d e }").unwrap();
    fs::write(dir.path().join("song.txt"), "c d e").unwrap();
    let dir_text = dir.path().to_string_lossy().to_string();

    let mut query = Query::open("engine", "cli")
        .question("Score file?")
        .kind(ReplyKind::FilePath)
        .limits([dir_text.as_str(), ".ly", ".LILY"])
        .build()
        .unwrap();

    assert!(query.reply_to("song.ly").unwrap());
    assert!(!query.reply_to("song.txt").unwrap());
    assert!(!query.reply_to("missing.ly").unwrap());

    let absolute = dir.path().join("song.ly").to_string_lossy().to_string();
    assert!(query.reply_to(absolute).unwrap());

    let mut unconstrained = Query::open("engine", "cli")
        .question("Any file?")
        .kind(ReplyKind::FilePath)
        .limits([dir_text.as_str()])
        .build()
        .unwrap();
    assert!(unconstrained.reply_to("song.txt").unwrap());
    assert!(!unconstrained.reply_to("").unwrap());
}

#[test]
fn test_buffers_and_other_kinds() {
    let mut buffers = Query::open("engine", "bot")
        .question("Score buffers?")
        .kind(ReplyKind::Buffers)
        .build()
        .unwrap();
    assert!(buffers
        .reply_to(Value::Buffers(vec!["c d e".into(), "C G".into()]))
        .unwrap());
    assert!(!buffers.reply_to("c d e").unwrap());
    assert!(!buffers
        .reply_to(Value::List(vec![Value::from("c"), Value::from(1)]))
        .unwrap());

    let mut other = Query::open("engine", "bot")
        .question("Anything?")
        .kind(ReplyKind::Other)
        .build()
        .unwrap();
    assert!(other.reply_to(Value::Bool(false)).unwrap());
    assert!(other.reply_to("").unwrap());
}

#[test]
fn test_render_modes_open_query() {
    let mut query = Query::open("engine", "web")
        .question("Formats?")
        .kind(ReplyKind::RenderModes)
        .build()
        .unwrap();
    assert!(query.reply_to("svg midi").unwrap());
    assert_eq!(
        query.reply_result(),
        Some(Value::List(vec![
            Value::RenderMode(RenderMode::Svg),
            Value::RenderMode(RenderMode::Midi),
        ]))
    );
    assert!(!query.reply_to("svg gif").unwrap());
}
