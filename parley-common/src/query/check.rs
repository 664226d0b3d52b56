//! Answer checks and result derivation
//!
//! A failed check is data, never an error: the caller re-asks the question.

use super::{Query, QueryVariant};
use crate::reply_kind::ReplyKind;
use crate::values::{normalize, Value};
use std::path::{Path, PathBuf};

fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

/// Limits of a file path query that name extensions rather than directories
fn is_extension(limit: &str) -> bool {
    limit.len() > 1 && limit.starts_with('.') && limit != ".." && !limit.contains(['/', '\\'])
}

impl Query {
    /// Whether an already sanitized answer satisfies this query
    pub(crate) fn check_answer(&self, answer: &Value) -> bool {
        if self.variant.is_choice() {
            return self.resolve_indices(answer).is_some();
        }
        if !self.reply_kind.accepts(answer) {
            return false;
        }

        match self.reply_kind {
            ReplyKind::Text => match (&self.pattern, answer) {
                (Some(pattern), Value::Text(text)) => pattern.is_match(text),
                _ => true,
            },
            ReplyKind::Number => self.check_range(answer),
            ReplyKind::InputMode
            | ReplyKind::RenderModes
            | ReplyKind::AspectRatio
            | ReplyKind::Instrument => self.check_membership(answer),
            ReplyKind::FilePath => answer.as_text().is_some_and(|path| self.check_file(path)),
            ReplyKind::Note | ReplyKind::Buffers | ReplyKind::Other => true,
        }
    }

    fn check_range(&self, answer: &Value) -> bool {
        let Some(number) = answer.as_f64() else {
            return false;
        };
        match self.limits.as_slice() {
            [min, max] => match (min.as_f64(), max.as_f64()) {
                (Some(min), Some(max)) => min <= number && number <= max,
                _ => false,
            },
            _ => true,
        }
    }

    fn check_membership(&self, answer: &Value) -> bool {
        if self.limits.is_empty() {
            return true;
        }
        let allowed: Vec<Value> = self
            .limits
            .iter()
            .filter_map(|limit| self.reply_kind.resolve(limit))
            .flat_map(flatten)
            .collect();
        match self.reply_kind.resolve(answer) {
            Some(resolved) => flatten(resolved).iter().all(|member| allowed.contains(member)),
            None => false,
        }
    }

    fn check_file(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let (extensions, directories): (Vec<&str>, Vec<&str>) = self
            .limits
            .iter()
            .filter_map(Value::as_text)
            .partition(|limit| is_extension(limit));
        let directories: Vec<PathBuf> = if directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            directories.iter().map(|dir| PathBuf::from(*dir)).collect()
        };

        let candidate = Path::new(path);
        let exists = directories.iter().any(|dir| dir.join(candidate).exists());
        let extension_matches = extensions.is_empty()
            || candidate.extension().is_some_and(|ext| {
                let ext = ext.to_string_lossy();
                extensions.iter().any(|wanted| wanted[1..].eq_ignore_ascii_case(&ext))
            });
        exists && extension_matches
    }

    /// Index of the limit a single answer token designates: a loose match
    /// on the limit's text first, then a numeric index
    pub fn resolve_index(&self, token: &str) -> Option<usize> {
        let wanted = normalize(token);
        if wanted.is_empty() {
            return None;
        }
        self.limits
            .iter()
            .position(|limit| normalize(&limit.to_string()) == wanted)
            .or_else(|| {
                token
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index < self.limits.len())
            })
    }

    /// Limit indices designated by an answer; None if any token fails
    fn resolve_indices(&self, answer: &Value) -> Option<Vec<usize>> {
        let text = answer.to_string();
        if let Some(index) = self.resolve_index(&text) {
            return Some(vec![index]);
        }
        if self.variant != QueryVariant::MultipleChoice {
            return None;
        }

        let tokens: Vec<String> = match answer {
            Value::List(items) => items.iter().map(ToString::to_string).collect(),
            _ => text
                .split(is_token_separator)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        };
        if tokens.is_empty() {
            return None;
        }
        tokens.iter().map(|token| self.resolve_index(token)).collect()
    }

    /// Engine-ready form of a valid answer
    pub(crate) fn derive_result(&self, answer: &Value) -> Option<Value> {
        match self.variant {
            QueryVariant::Boolean => {
                let indices = self.resolve_indices(answer)?;
                Some(Value::Bool(indices.first()? % 2 == 0))
            }
            QueryVariant::SingleChoice => {
                let indices = self.resolve_indices(answer)?;
                self.limits.get(*indices.first()?).cloned()
            }
            QueryVariant::MultipleChoice => {
                let indices = self.resolve_indices(answer)?;
                let chosen = indices
                    .iter()
                    .filter_map(|index| self.limits.get(*index).cloned())
                    .collect();
                Some(Value::List(chosen))
            }
            QueryVariant::Open | QueryVariant::Information => match self.reply_kind {
                ReplyKind::Number => coerce_number(answer),
                kind if kind.is_enumeration() => kind.resolve(answer),
                _ => Some(answer.clone()),
            },
        }
    }
}

fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        other => vec![other],
    }
}

/// Integral numbers become integers, the rest stay floating
fn coerce_number(answer: &Value) -> Option<Value> {
    if let Value::Integer(n) = answer {
        return Some(Value::Integer(*n));
    }
    let number = answer.as_f64()?;
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(Value::Integer(number as i64))
    } else {
        Some(Value::Float(number))
    }
}
