//! Participant identities and the recipient contract
//!
//! A participant is anything that can answer to a name: a front-end (command
//! line, chat bot, web form) or the generation engine. Queries only ever store
//! the resolved name; the whitelist decides which names are legal.

use crate::query::QueryRef;
use crate::Result;

/// Participant names accepted when no configuration overrides them
pub const DEFAULT_PARTICIPANTS: &[&str] = &["engine", "cli", "bot", "web"];

/// Anything that resolves to a participant name
pub trait Identity {
    fn name(&self) -> &str;
}

impl Identity for str {
    fn name(&self) -> &str {
        self
    }
}

impl Identity for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A participant able to receive queries and resolve their replies.
///
/// `receive` must keep the query in a store the recipient owns. How
/// `execute_queries` collects answers (prompting, chat messages, form
/// fields) is up to the front-end; it ends by calling `reply_to` on each
/// query it could answer.
pub trait Recipient: Identity {
    fn receive(&mut self, query: QueryRef) -> Result<()>;

    fn receive_all(&mut self, queries: Vec<QueryRef>) -> Result<()> {
        for query in queries {
            self.receive(query)?;
        }
        Ok(())
    }

    fn execute_queries(&mut self, queries: &[QueryRef]) -> Result<()>;
}

/// Whitelist of known participant names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants(Vec<String>);

impl Participants {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Participants(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|known| known == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Participants {
    fn default() -> Self {
        Participants::new(DEFAULT_PARTICIPANTS.iter().copied())
    }
}
