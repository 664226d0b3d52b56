//! The asking side of the protocol
//!
//! The engine builds a fixed score-setup interview, sends whatever is still
//! unanswered to a front-end and collects the results once the front-end has
//! replied.

use parley_common::config::ProtocolConfig;
use parley_common::{
    AspectRatio, Enumeration, Identity, InputMode, Instrument, Locale, Participants, Query,
    QueryBuilder, QueryRef, QueryStore, Recipient, RenderMode, ReplyKind, Result, Value,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const ENGINE_NAME: &str = "engine";

/// Default number of send/answer rounds before giving up
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Extensions accepted for the optional template file
const TEMPLATE_EXTENSIONS: &[&str] = &[".ly", ".txt"];

pub struct Engine {
    name: String,
    store: QueryStore,
    locale: Locale,
    participants: Participants,
    directories: Vec<PathBuf>,
    max_rounds: usize,
}

impl Engine {
    pub fn new(config: &ProtocolConfig) -> Self {
        Engine {
            name: ENGINE_NAME.to_string(),
            store: QueryStore::new(ENGINE_NAME),
            locale: config.locale,
            participants: config.participants.clone(),
            directories: config.directories.clone(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    fn query<R: Identity + ?Sized>(&self, builder: fn(&str, &R) -> QueryBuilder, recipient: &R) -> QueryBuilder {
        builder(self.name.as_str(), recipient)
            .locale(self.locale)
            .participants(&self.participants)
    }

    /// Queue the score-setup interview for `recipient`
    pub fn prepare_interview<R: Identity + ?Sized>(&mut self, recipient: &R, with_template: bool) -> Result<()> {
        let welcome = self
            .query(Query::information, recipient)
            .name("welcome")
            .foreword("Let's set up a new score. Type ? on any question for help.")
            .build_shared()?;

        let input_mode = self
            .query(Query::single_choice, recipient)
            .name("input mode")
            .question("How will you enter the music?")
            .help_text("Notes are single pitches, chords are chord symbols, keys are key signatures.")
            .limits(InputMode::all_variants().iter().copied())
            .build_shared()?;

        let notes = self
            .query(Query::open, recipient)
            .name("notes")
            .question("Enter the music:")
            .input_tip("Separate entries with spaces, e.g. c d e f g")
            .kind(ReplyKind::Note)
            .prerequisite(&input_mode)
            .build_shared()?;

        let render_modes = self
            .query(Query::multiple_choice, recipient)
            .name("render modes")
            .question("Which outputs should be rendered?")
            .input_tip("Pick one or more, separated by spaces or commas.")
            .limits(RenderMode::all_variants().iter().copied())
            .build_shared()?;

        let aspect_ratio = self
            .query(Query::single_choice, recipient)
            .name("aspect ratio")
            .question("Page aspect ratio?")
            .limits(AspectRatio::all_variants().iter().copied())
            .build_shared()?;

        let diagrams = self
            .query(Query::boolean, recipient)
            .name("diagrams")
            .question("Draw instrument diagrams?")
            .build_shared()?;

        let instrument = self
            .query(Query::single_choice, recipient)
            .name("instrument")
            .question("Which instrument are the diagrams for?")
            .limits(Instrument::all_variants().iter().copied())
            .prerequisite(&diagrams)
            .build_shared()?;

        let tempo = self
            .query(Query::open, recipient)
            .name("tempo")
            .question("Tempo in beats per minute?")
            .help_text("Blank or 0 is not a tempo; pick a value between 20 and 300.")
            .limits([20, 300])
            .build_shared()?;

        self.store.store_all([
            welcome,
            input_mode,
            notes,
            render_modes,
            aspect_ratio,
            diagrams,
            instrument,
            tempo,
        ]);

        if with_template {
            let mut limits: Vec<Value> = self
                .directories
                .iter()
                .map(|dir| Value::from(dir.to_string_lossy().to_string()))
                .collect();
            limits.extend(TEMPLATE_EXTENSIONS.iter().map(|ext| Value::from(*ext)));
            let template = self
                .query(Query::open, recipient)
                .name("template")
                .question("Template file to start from?")
                .input_tip(format!(
                    "A {} file found in one of: {}",
                    TEMPLATE_EXTENSIONS.join(" or "),
                    self.directories
                        .iter()
                        .map(|dir| dir.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .kind(ReplyKind::FilePath)
                .limits(limits)
                .build_shared()?;
            self.store.store(template);
        }

        info!("{} prepared {} queries for {}", self.name, self.store.len(), recipient.name());
        Ok(())
    }

    fn needs_sending(&self, query: &Query) -> bool {
        if query.sender() != self.name {
            return false;
        }
        if query.is_information() {
            !query.is_sent()
        } else {
            !query.is_satisfied()
        }
    }

    /// Send, let `recipient` answer and repeat until every question has a
    /// valid answer or the round limit is hit. Returns whether everything
    /// was answered.
    pub fn drive<R: Recipient + ?Sized>(&mut self, recipient: &mut R) -> Result<bool> {
        for round in 1..=self.max_rounds {
            self.store.topological_sort()?;

            let outgoing: Vec<QueryRef> = self
                .store
                .iter()
                .filter(|query| self.needs_sending(&query.borrow()))
                .cloned()
                .collect();
            if outgoing.is_empty() {
                info!("All questions answered after {} round(s)", round - 1);
                return Ok(true);
            }

            debug!("Round {}: sending {} queries to {}", round, outgoing.len(), recipient.name());
            for query in &outgoing {
                query.send(&mut *recipient)?;
            }
            recipient.execute_queries(&outgoing)?;
        }

        let pending = self.store.pending();
        if pending.is_empty() {
            return Ok(true);
        }
        warn!(
            "Giving up after {} rounds, unanswered: {}",
            self.max_rounds,
            pending.iter().map(QueryRef::name).collect::<Vec<_>>().join(", ")
        );
        Ok(false)
    }

    /// Name and result of every question, in store order
    pub fn results(&self) -> Vec<(String, Option<Value>)> {
        self.store
            .iter()
            .filter(|query| query.borrow().expect_reply())
            .map(|query| (query.name(), query.borrow().reply_result()))
            .collect()
    }

    pub fn result(&self, name: &str) -> Option<Value> {
        self.store
            .iter()
            .find(|query| query.borrow().name() == name)
            .and_then(|query| query.borrow().reply_result())
    }

    pub fn report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Score setup:")?;
        for (name, result) in self.results() {
            match result {
                Some(value) => writeln!(out, "  {}: {}", name, value)?,
                None => writeln!(out, "  {}: (no answer)", name)?,
            }
        }
        Ok(())
    }
}

impl Identity for Engine {
    fn name(&self) -> &str {
        &self.name
    }
}
