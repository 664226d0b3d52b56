//! Queries: one question asked by one participant of another
//!
//! A query is immutable once built apart from its lifecycle state (sent time,
//! reply, help toggle) and appended prerequisites. Participants share queries
//! through [`QueryRef`], a single-threaded shared handle: the asking side keeps
//! one in its store while the recipient attaches the reply through another.

mod builder;
mod check;
mod display;
mod identifier;

pub use builder::QueryBuilder;

use crate::identity::{Participants, Recipient};
use crate::locale::Locale;
use crate::reply::Reply;
use crate::reply_kind::ReplyKind;
use crate::values::Value;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

/// Stands in for a prerequisite that leads back to a query being hashed or
/// checked
const CYCLE_MARKER: &str = "@cycle";

/// Names a query listed among its own prerequisites in errors
pub const SELF_MARKER: &str = "@self";

/// Query variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryVariant {
    /// Free answer checked against the reply kind
    Open,
    /// Exactly one of the limits
    SingleChoice,
    /// One or more of the limits
    MultipleChoice,
    /// Yes/no, answered with one of an even-length token list
    Boolean,
    /// Shown to the recipient, no answer expected
    Information,
}

impl QueryVariant {
    pub fn expects_reply(&self) -> bool {
        !matches!(self, QueryVariant::Information)
    }

    /// Variants whose answers must resolve to limit indices
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QueryVariant::SingleChoice | QueryVariant::MultipleChoice | QueryVariant::Boolean
        )
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    variant: QueryVariant,
    name: String,
    sender: String,
    recipient: String,
    question: Option<String>,
    foreword: Option<String>,
    afterword: Option<String>,
    help_text: Option<String>,
    input_tip: Option<String>,
    reply_kind: ReplyKind,
    limits: Vec<Value>,
    /// Compiled single-regex limit of open text queries
    pattern: Option<Regex>,
    prerequisites: Vec<QueryRef>,
    locale: Locale,
    participants: Participants,
    display: String,
    sent_time: Option<DateTime<Utc>>,
    help_required: bool,
    reply: Option<Reply>,
}

impl Query {
    pub fn variant(&self) -> QueryVariant {
        self.variant
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn foreword(&self) -> Option<&str> {
        self.foreword.as_deref()
    }

    pub fn afterword(&self) -> Option<&str> {
        self.afterword.as_deref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn input_tip(&self) -> Option<&str> {
        self.input_tip.as_deref()
    }

    pub fn reply_kind(&self) -> ReplyKind {
        self.reply_kind
    }

    pub fn limits(&self) -> &[Value] {
        &self.limits
    }

    pub fn prerequisites(&self) -> &[QueryRef] {
        &self.prerequisites
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Content hash shared by every query asking the same thing.
    ///
    /// Computed on each call from the current content, prerequisites
    /// included, so a retargeted or newly required prerequisite is reflected
    /// in every dependent.
    pub fn identifier(&self) -> String {
        self.content_hash(&mut vec![self as *const Query])
    }

    /// Hash of this query; `path` holds the queries being walked. A
    /// prerequisite already on the path hashes as a cycle marker.
    fn content_hash(&self, path: &mut Vec<*const Query>) -> String {
        let prerequisite_ids: Vec<String> = self
            .prerequisites
            .iter()
            .map(|p| {
                if path.contains(&p.data_ptr()) {
                    return CYCLE_MARKER.to_string();
                }
                let Some(prerequisite) = p.try_borrow() else {
                    return CYCLE_MARKER.to_string();
                };
                path.push(p.data_ptr());
                let id = prerequisite.content_hash(path);
                path.pop();
                id
            })
            .collect();
        identifier::compute(
            &self.sender,
            &self.recipient,
            self.foreword.as_deref(),
            self.question.as_deref(),
            self.afterword.as_deref(),
            &self.limits,
            &prerequisite_ids,
        )
    }

    /// Text a front-end shows for this query
    pub fn display_text(&self) -> &str {
        &self.display
    }

    pub fn sent_time(&self) -> Option<DateTime<Utc>> {
        self.sent_time
    }

    pub fn expect_reply(&self) -> bool {
        self.variant.expects_reply()
    }

    pub fn is_information(&self) -> bool {
        !self.expect_reply()
    }

    pub fn is_sent(&self) -> bool {
        self.sent_time.is_some()
    }

    pub fn is_replied(&self) -> bool {
        self.reply.is_some()
    }

    pub fn help_required(&self) -> bool {
        self.help_required
    }

    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    /// Validity of the attached reply; None while unreplied
    pub fn check_reply(&self) -> Option<bool> {
        self.reply.as_ref().map(|reply| reply.validity(self))
    }

    /// Engine-ready result of the attached reply; None if unreplied or invalid
    pub fn reply_result(&self) -> Option<Value> {
        self.reply.as_ref()?.result(self)
    }

    /// Replied with a valid answer
    pub fn is_satisfied(&self) -> bool {
        self.check_reply() == Some(true)
    }

    /// Attach an answer, replacing any previous reply, and return its validity.
    ///
    /// An answer whose first token is `?` toggles the help text. A valid
    /// answer is refused (and not attached) while any prerequisite lacks a
    /// valid reply of its own.
    pub fn reply_to(&mut self, answer: impl Into<Value>) -> Result<bool> {
        let answer = answer.into();
        if Reply::is_help_sentinel(&answer) {
            self.help_required = !self.help_required;
            self.refresh_display();
        }

        let reply = Reply::new(self, answer);
        let valid = reply.validity(self);
        if valid {
            for prerequisite in &self.prerequisites {
                let satisfied = prerequisite
                    .try_borrow()
                    .map(|p| p.is_satisfied())
                    .unwrap_or(false);
                if !satisfied {
                    let prerequisite_name = prerequisite
                        .try_borrow()
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| SELF_MARKER.to_string());
                    warn!(
                        "Reply to '{}' arrived before prerequisite '{}'",
                        self.name, prerequisite_name
                    );
                    return Err(Error::UnmetPrerequisite {
                        query: self.name.clone(),
                        prerequisite: prerequisite_name,
                    });
                }
            }
        }

        debug!(
            "{} replied to '{}' with '{}' (valid: {})",
            self.recipient,
            self.name,
            reply.answer(),
            valid
        );
        self.reply = Some(reply);
        Ok(valid)
    }

    pub(crate) fn mark_sent(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.is_satisfied() {
            return Err(Error::AlreadySatisfied(self.name.clone()));
        }
        self.reply = None;
        self.sent_time = Some(at);
        Ok(())
    }

    fn retarget(&mut self, recipient: &str) -> Result<()> {
        if !self.participants.contains(recipient) {
            return Err(Error::UnknownParticipant(recipient.to_string()));
        }
        if recipient == self.sender {
            return Err(Error::SameParticipant(recipient.to_string()));
        }
        debug!("Retargeting '{}' from {} to {}", self.name, self.recipient, recipient);
        self.recipient = recipient.to_string();
        Ok(())
    }

    pub(crate) fn refresh_display(&mut self) {
        self.display = display::render(self);
    }
}

/// Shared handle to a query
#[derive(Clone)]
pub struct QueryRef(Rc<RefCell<Query>>);

impl QueryRef {
    pub fn new(query: Query) -> Self {
        QueryRef(Rc::new(RefCell::new(query)))
    }

    /// Borrow the query. Panics if it is being mutated through another handle.
    pub fn borrow(&self) -> Ref<'_, Query> {
        self.0.borrow()
    }

    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, Query>> {
        self.0.try_borrow().ok()
    }

    /// Same query object (not merely the same content)
    pub fn ptr_eq(&self, other: &QueryRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn as_ptr(&self) -> *const RefCell<Query> {
        Rc::as_ptr(&self.0)
    }

    /// Address of the query itself, readable while it is mutably borrowed
    fn data_ptr(&self) -> *const Query {
        self.0.as_ptr()
    }

    pub fn name(&self) -> String {
        self.borrow().name.clone()
    }

    pub fn identifier(&self) -> String {
        self.borrow().identifier()
    }

    /// Send now; see [`QueryRef::send_at`]
    pub fn send<R: Recipient + ?Sized>(&self, recipient: &mut R) -> Result<()> {
        self.send_at(recipient, Utc::now())
    }

    /// Mark the query sent at `at`, clear any previous reply and hand it to
    /// the recipient. A recipient other than the query's own retargets it.
    pub fn send_at<R: Recipient + ?Sized>(&self, recipient: &mut R, at: DateTime<Utc>) -> Result<()> {
        {
            let mut query = self.0.borrow_mut();
            if recipient.name() != query.recipient {
                query.retarget(recipient.name())?;
            }
            query.mark_sent(at)?;
            debug!("{} sent '{}' to {}", query.sender, query.name, query.recipient);
        }
        recipient.receive(self.clone())
    }

    pub fn reply_to(&self, answer: impl Into<Value>) -> Result<bool> {
        self.0.borrow_mut().reply_to(answer)
    }

    /// Append a prerequisite after construction
    pub fn require(&self, prerequisite: &QueryRef) {
        self.0.borrow_mut().prerequisites.push(prerequisite.clone());
    }
}

impl From<Query> for QueryRef {
    fn from(query: Query) -> Self {
        QueryRef::new(query)
    }
}

impl std::fmt::Debug for QueryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.try_borrow() {
            Some(query) => f
                .debug_struct("QueryRef")
                .field("name", &query.name)
                .field("identifier", &query.identifier())
                .finish(),
            None => f.write_str("QueryRef(<borrowed>)"),
        }
    }
}
