//! Query construction
//!
//! Checks run in a fixed order (sender, recipient, question, limits) and a
//! query only comes into existence once all of them pass.

use super::{Query, QueryRef, QueryVariant};
use crate::identity::{Identity, Participants};
use crate::locale::Locale;
use crate::reply_kind::ReplyKind;
use crate::values::Value;
use crate::{Error, Result};
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    variant: QueryVariant,
    sender: String,
    recipient: String,
    name: Option<String>,
    question: Option<String>,
    foreword: Option<String>,
    afterword: Option<String>,
    help_text: Option<String>,
    input_tip: Option<String>,
    reply_kind: Option<ReplyKind>,
    limits: Option<Vec<Value>>,
    prerequisites: Vec<QueryRef>,
    locale: Locale,
    participants: Participants,
}

impl Query {
    pub fn builder<S, R>(variant: QueryVariant, sender: &S, recipient: &R) -> QueryBuilder
    where
        S: Identity + ?Sized,
        R: Identity + ?Sized,
    {
        QueryBuilder {
            variant,
            sender: sender.name().to_string(),
            recipient: recipient.name().to_string(),
            name: None,
            question: None,
            foreword: None,
            afterword: None,
            help_text: None,
            input_tip: None,
            reply_kind: None,
            limits: None,
            prerequisites: Vec::new(),
            locale: Locale::default(),
            participants: Participants::default(),
        }
    }

    pub fn open<S: Identity + ?Sized, R: Identity + ?Sized>(sender: &S, recipient: &R) -> QueryBuilder {
        Query::builder(QueryVariant::Open, sender, recipient)
    }

    pub fn single_choice<S: Identity + ?Sized, R: Identity + ?Sized>(sender: &S, recipient: &R) -> QueryBuilder {
        Query::builder(QueryVariant::SingleChoice, sender, recipient)
    }

    pub fn multiple_choice<S: Identity + ?Sized, R: Identity + ?Sized>(sender: &S, recipient: &R) -> QueryBuilder {
        Query::builder(QueryVariant::MultipleChoice, sender, recipient)
    }

    pub fn boolean<S: Identity + ?Sized, R: Identity + ?Sized>(sender: &S, recipient: &R) -> QueryBuilder {
        Query::builder(QueryVariant::Boolean, sender, recipient)
    }

    pub fn information<S: Identity + ?Sized, R: Identity + ?Sized>(sender: &S, recipient: &R) -> QueryBuilder {
        Query::builder(QueryVariant::Information, sender, recipient)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

impl QueryBuilder {
    /// Name used in logs and recall; defaults to the question text
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn foreword(mut self, foreword: impl Into<String>) -> Self {
        self.foreword = Some(foreword.into());
        self
    }

    pub fn afterword(mut self, afterword: impl Into<String>) -> Self {
        self.afterword = Some(afterword.into());
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn input_tip(mut self, input_tip: impl Into<String>) -> Self {
        self.input_tip = Some(input_tip.into());
        self
    }

    pub fn kind(mut self, kind: ReplyKind) -> Self {
        self.reply_kind = Some(kind);
        self
    }

    pub fn limits<I, V>(mut self, limits: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.limits = Some(limits.into_iter().map(Into::into).collect());
        self
    }

    pub fn prerequisite(mut self, prerequisite: &QueryRef) -> Self {
        self.prerequisites.push(prerequisite.clone());
        self
    }

    pub fn prerequisites<'a, I>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = &'a QueryRef>,
    {
        self.prerequisites.extend(prerequisites.into_iter().cloned());
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Participant whitelist to validate sender and recipient against
    pub fn participants(mut self, participants: &Participants) -> Self {
        self.participants = participants.clone();
        self
    }

    pub fn build_shared(self) -> Result<QueryRef> {
        self.build().map(QueryRef::new)
    }

    pub fn build(self) -> Result<Query> {
        let participants = self.participants;
        if !participants.contains(&self.sender) {
            return Err(Error::UnknownParticipant(self.sender));
        }
        if !participants.contains(&self.recipient) {
            return Err(Error::UnknownParticipant(self.recipient));
        }
        if self.sender == self.recipient {
            return Err(Error::SameParticipant(self.sender));
        }

        let question = non_blank(self.question);
        let foreword = non_blank(self.foreword);
        let afterword = non_blank(self.afterword);
        if self.variant.expects_reply() {
            if question.is_none() {
                return Err(Error::InvalidQuestion(format!(
                    "{:?} query from {} to {} has no question text",
                    self.variant, self.sender, self.recipient
                )));
            }
        } else if question.is_none() && foreword.is_none() && afterword.is_none() {
            return Err(Error::InvalidQuestion(format!(
                "information from {} to {} has no text",
                self.sender, self.recipient
            )));
        }

        let name = non_blank(self.name)
            .or_else(|| question.clone())
            .or_else(|| foreword.clone())
            .or_else(|| afterword.clone())
            .unwrap_or_default();

        let limits = self.limits.unwrap_or_default();
        let LimitsCheck {
            limits,
            reply_kind,
            pattern,
        } = check_limits(&name, self.variant, self.reply_kind, limits, self.locale)?;

        let mut query = Query {
            variant: self.variant,
            name,
            sender: self.sender,
            recipient: self.recipient,
            question,
            foreword,
            afterword,
            help_text: non_blank(self.help_text),
            input_tip: non_blank(self.input_tip),
            reply_kind,
            limits,
            pattern,
            prerequisites: self.prerequisites,
            locale: self.locale,
            participants,
            display: String::new(),
            sent_time: None,
            help_required: false,
            reply: None,
        };
        query.refresh_display();
        debug!("Built {:?} query '{}' ({})", query.variant, query.name, query.identifier());
        Ok(query)
    }
}

struct LimitsCheck {
    limits: Vec<Value>,
    reply_kind: ReplyKind,
    pattern: Option<Regex>,
}

fn check_limits(
    name: &str,
    variant: QueryVariant,
    reply_kind: Option<ReplyKind>,
    mut limits: Vec<Value>,
    locale: Locale,
) -> Result<LimitsCheck> {
    let invalid = |reason: String| Error::InvalidLimits {
        query: name.to_string(),
        reason,
    };

    match variant {
        QueryVariant::Boolean if limits.is_empty() || limits.len() % 2 == 1 => {
            if !limits.is_empty() {
                debug!("Odd-length yes/no tokens for '{}', using locale defaults", name);
            }
            let (yes, no) = locale.yes_no();
            limits = vec![Value::from(yes), Value::from(no)];
        }
        QueryVariant::SingleChoice | QueryVariant::MultipleChoice if limits.is_empty() => {
            return Err(invalid(format!("{:?} query needs at least one choice", variant)));
        }
        _ => {}
    }

    if let Some(first) = limits.first() {
        let shape = first.shape();
        if let Some(odd) = limits.iter().find(|limit| !limit.shape().same_family(&shape)) {
            return Err(invalid(format!(
                "mixed value shapes {:?} and {:?}",
                shape,
                odd.shape()
            )));
        }
    }

    let reply_kind = reply_kind.unwrap_or_else(|| match limits.first() {
        Some(sample) => ReplyKind::infer_from(sample),
        None if variant == QueryVariant::Information => ReplyKind::Other,
        None => ReplyKind::Text,
    });

    if let Some(bad) = limits.iter().find(|limit| !reply_kind.accepts(limit)) {
        return Err(invalid(format!("'{}' is not a valid {} value", bad, reply_kind)));
    }

    let mut pattern = None;
    if variant == QueryVariant::Open {
        match reply_kind {
            ReplyKind::Number if !limits.is_empty() => {
                let bounds: Vec<f64> = limits.iter().filter_map(Value::as_f64).collect();
                match bounds.as_slice() {
                    [min, max] if min <= max => {}
                    [min, max] => return Err(invalid(format!("range [{}, {}] is empty", min, max))),
                    _ => return Err(invalid("numeric limits must be [min, max]".to_string())),
                }
            }
            ReplyKind::Text if !limits.is_empty() => match limits.as_slice() {
                [Value::Text(source)] => {
                    let compiled = Regex::new(&format!("^(?:{})", source))
                        .map_err(|e| invalid(format!("bad pattern '{}': {}", source, e)))?;
                    pattern = Some(compiled);
                }
                _ => return Err(invalid("open text queries take a single pattern".to_string())),
            },
            _ => {}
        }
    }

    Ok(LimitsCheck {
        limits,
        reply_kind,
        pattern,
    })
}
