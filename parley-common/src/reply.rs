//! Replies: the answer to exactly one query
//!
//! A reply keeps the raw answer, its sanitized form and two lazily derived
//! facts: validity and the engine-ready result. Both are computed against the
//! owning query on demand. A `true` validity is cached for good; `false` is
//! recomputed on every call since the world it was checked against (files on
//! disk, prerequisite replies) can still change.

use crate::query::Query;
use crate::reply_kind::ReplyKind;
use crate::values::Value;
use once_cell::unsync::OnceCell;
use std::cell::Cell;

/// Answer token asking for the query's help text
pub const HELP_SENTINEL: &str = "?";

#[derive(Debug, Clone)]
pub struct Reply {
    query_identifier: String,
    answer: Value,
    sanitized: Value,
    help_request: bool,
    valid: Cell<bool>,
    result: OnceCell<Value>,
}

impl Reply {
    pub fn new(query: &Query, answer: impl Into<Value>) -> Self {
        let answer = answer.into();
        let sanitized = sanitize(query.reply_kind(), &answer);
        Reply {
            query_identifier: query.identifier(),
            help_request: Reply::is_help_sentinel(&answer),
            answer,
            sanitized,
            valid: Cell::new(false),
            result: OnceCell::new(),
        }
    }

    /// Whether the answer's first token is the help sentinel
    pub fn is_help_sentinel(answer: &Value) -> bool {
        answer
            .as_text()
            .and_then(|text| text.split_whitespace().next())
            == Some(HELP_SENTINEL)
    }

    /// Identifier of the query this reply answers
    pub fn query_identifier(&self) -> &str {
        &self.query_identifier
    }

    /// Answer exactly as received
    pub fn answer(&self) -> &Value {
        &self.answer
    }

    pub fn sanitized(&self) -> &Value {
        &self.sanitized
    }

    pub fn is_help_request(&self) -> bool {
        self.help_request
    }

    /// Whether the answer satisfies `query`. A help request never does.
    pub fn validity(&self, query: &Query) -> bool {
        if self.valid.get() {
            return true;
        }
        let valid = !self.help_request && query.check_answer(&self.sanitized);
        if valid {
            self.valid.set(true);
        }
        valid
    }

    /// Engine-ready result, None while the answer is invalid
    pub fn result(&self, query: &Query) -> Option<Value> {
        if let Some(result) = self.result.get() {
            return Some(result.clone());
        }
        if !self.validity(query) {
            return None;
        }
        let derived = query.derive_result(&self.sanitized)?;
        Some(self.result.get_or_init(|| derived).clone())
    }
}

/// Trim text answers; a blank `Number` answer reads as zero
fn sanitize(kind: ReplyKind, answer: &Value) -> Value {
    match answer {
        Value::Text(_) if kind == ReplyKind::Number && answer.is_blank() => Value::from("0"),
        Value::Text(text) => Value::from(text.trim()),
        other => other.clone(),
    }
}
