//! Per-participant catalogue of exchanged queries
//!
//! The store accepts duplicates on insertion; they are reconciled by explicit
//! maintenance (`erase_repeated`, `clean`). Recall and erase share one
//! selection rule: filters first, then the criterion.

mod sort;

use crate::identity::Identity;
use crate::query::{Query, QueryRef};
use crate::values::normalize;
use crate::Result;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, info};

/// Named predicate over a stored query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Replied,
    Unreplied,
    Sent,
    Unsent,
    ValidReply,
    InvalidReply,
    /// Not replied, or replied with an invalid answer
    Unsatisfied,
    /// Sent by the store owner
    FromOwner,
    /// Addressed to the store owner
    ToOwner,
    Information,
    Question,
}

impl Filter {
    pub fn matches(&self, query: &Query, owner: &str) -> bool {
        match self {
            Filter::Replied => query.is_replied(),
            Filter::Unreplied => !query.is_replied(),
            Filter::Sent => query.is_sent(),
            Filter::Unsent => !query.is_sent(),
            Filter::ValidReply => query.check_reply() == Some(true),
            Filter::InvalidReply => query.check_reply() == Some(false),
            Filter::Unsatisfied => query.check_reply() != Some(true),
            Filter::FromOwner => query.sender() == owner,
            Filter::ToOwner => query.recipient() == owner,
            Filter::Information => query.is_information(),
            Filter::Question => query.expect_reply(),
        }
    }
}

/// Ordering applied to recall results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    SentTime,
    Name,
    Identifier,
    Question,
    Sender,
    Recipient,
}

/// What to select among the filtered queries.
///
/// `Text` tries an exact match on any searchable field first and only falls
/// back to a case/space-insensitive regex match when nothing matched exactly.
#[derive(Debug, Clone)]
pub enum Criterion {
    All,
    Index(usize),
    Query(QueryRef),
    Text(String),
}

impl From<usize> for Criterion {
    fn from(index: usize) -> Self {
        Criterion::Index(index)
    }
}

impl From<&str> for Criterion {
    fn from(text: &str) -> Self {
        Criterion::Text(text.to_string())
    }
}

impl From<String> for Criterion {
    fn from(text: String) -> Self {
        Criterion::Text(text)
    }
}

impl From<QueryRef> for Criterion {
    fn from(query: QueryRef) -> Self {
        Criterion::Query(query)
    }
}

impl From<&QueryRef> for Criterion {
    fn from(query: &QueryRef) -> Self {
        Criterion::Query(query.clone())
    }
}

/// String fields `recall` searches, in order
pub fn searchable_fields(query: &Query) -> [Option<Cow<'_, str>>; 9] {
    [
        Some(Cow::Borrowed(query.name())),
        query.question().map(Cow::Borrowed),
        query.foreword().map(Cow::Borrowed),
        query.afterword().map(Cow::Borrowed),
        query.help_text().map(Cow::Borrowed),
        query.input_tip().map(Cow::Borrowed),
        Some(Cow::Owned(query.identifier())),
        Some(Cow::Borrowed(query.sender())),
        Some(Cow::Borrowed(query.recipient())),
    ]
}

/// Case-insensitive pattern with whitespace removed, matched against fields
/// normalized the same way. The pattern text keeps its case so escapes like
/// `\B` or `\W` mean what they say.
fn loose_pattern(text: &str) -> Option<Regex> {
    let pattern: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if pattern.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", pattern))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(&pattern))))
        .ok()
}

#[derive(Debug, Clone)]
pub struct QueryStore {
    owner: String,
    queries: Vec<QueryRef>,
}

impl QueryStore {
    pub fn new<O: Identity + ?Sized>(owner: &O) -> Self {
        QueryStore {
            owner: owner.name().to_string(),
            queries: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryRef> {
        self.queries.iter()
    }

    pub fn queries(&self) -> &[QueryRef] {
        &self.queries
    }

    pub fn store(&mut self, query: QueryRef) {
        debug!("{} stores '{}'", self.owner, query.name());
        self.queries.push(query);
    }

    pub fn store_all<I: IntoIterator<Item = QueryRef>>(&mut self, queries: I) {
        for query in queries {
            self.store(query);
        }
    }

    /// Queries matching `criterion` among those passing every filter,
    /// optionally sorted (stable) by `sort`
    pub fn recall(
        &self,
        criterion: impl Into<Criterion>,
        filters: &[Filter],
        sort: Option<SortKey>,
    ) -> Vec<QueryRef> {
        let mut found: Vec<QueryRef> = self
            .select(&criterion.into(), filters)
            .into_iter()
            .map(|index| self.queries[index].clone())
            .collect();
        if let Some(key) = sort {
            sort::sort_by_key(&mut found, key);
        }
        found
    }

    /// Questions the owner asked that still wait for a valid answer, in
    /// store order
    pub fn pending(&self) -> Vec<QueryRef> {
        self.recall(
            Criterion::All,
            &[Filter::FromOwner, Filter::Question, Filter::Unsatisfied],
            None,
        )
    }

    /// Groups of filtered queries sharing an identifier, only groups with
    /// more than one member, in order of first appearance
    pub fn recall_repeated(&self, filters: &[Filter]) -> Vec<Vec<QueryRef>> {
        self.repeated_groups(filters)
            .into_iter()
            .map(|group| group.into_iter().map(|index| self.queries[index].clone()).collect())
            .collect()
    }

    /// Within each repeated group keep only the most recently sent query.
    /// Returns the number of queries erased.
    pub fn erase_repeated(&mut self, filters: &[Filter]) -> usize {
        let mut doomed: Vec<usize> = Vec::new();
        for group in self.repeated_groups(filters) {
            let keep = group
                .iter()
                .copied()
                .max_by_key(|index| (self.queries[*index].borrow().sent_time(), *index));
            doomed.extend(group.into_iter().filter(|index| Some(*index) != keep));
        }
        let erased = self.remove_indices(&doomed);
        if erased > 0 {
            info!("{} erased {} repeated queries", self.owner, erased);
        }
        erased
    }

    /// Remove the selected queries and return them
    pub fn erase(&mut self, criterion: impl Into<Criterion>, filters: &[Filter]) -> Vec<QueryRef> {
        let selected = self.select(&criterion.into(), filters);
        let erased: Vec<QueryRef> = selected.iter().map(|index| self.queries[*index].clone()).collect();
        self.remove_indices(&selected);
        debug!("{} erased {} queries", self.owner, erased.len());
        erased
    }

    pub fn erase_all(&mut self) {
        debug!("{} erased all {} queries", self.owner, self.queries.len());
        self.queries.clear();
    }

    /// Drop repeated unanswered queries, then order by prerequisites
    pub fn clean(&mut self) -> Result<()> {
        self.erase_repeated(&[Filter::Unreplied]);
        self.topological_sort()
    }

    /// Drop every replied query, then order by prerequisites
    pub fn flush(&mut self) -> Result<()> {
        self.erase(Criterion::All, &[Filter::Replied]);
        self.topological_sort()
    }

    fn filtered(&self, filters: &[Filter]) -> Vec<usize> {
        (0..self.queries.len())
            .filter(|index| {
                let query = self.queries[*index].borrow();
                filters.iter().all(|filter| filter.matches(&query, &self.owner))
            })
            .collect()
    }

    fn select(&self, criterion: &Criterion, filters: &[Filter]) -> Vec<usize> {
        let candidates = self.filtered(filters);
        match criterion {
            Criterion::All => candidates,
            Criterion::Index(position) => candidates.get(*position).copied().into_iter().collect(),
            Criterion::Query(wanted) => candidates
                .into_iter()
                .filter(|index| self.queries[*index].ptr_eq(wanted))
                .collect(),
            Criterion::Text(text) => {
                let exact: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|index| {
                        let query = self.queries[*index].borrow();
                        let fields = searchable_fields(&query);
                        fields.iter().flatten().any(|field| field.as_ref() == text.as_str())
                    })
                    .collect();
                if !exact.is_empty() {
                    return exact;
                }
                let Some(pattern) = loose_pattern(text) else {
                    return Vec::new();
                };
                candidates
                    .into_iter()
                    .filter(|index| {
                        let query = self.queries[*index].borrow();
                        let fields = searchable_fields(&query);
                        fields.iter().flatten().any(|field| pattern.is_match(&normalize(field)))
                    })
                    .collect()
            }
        }
    }

    fn repeated_groups(&self, filters: &[Filter]) -> Vec<Vec<usize>> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for index in self.filtered(filters) {
            let identifier = self.queries[index].identifier();
            groups
                .entry(identifier.clone())
                .or_insert_with(|| {
                    order.push(identifier);
                    Vec::new()
                })
                .push(index);
        }
        order
            .into_iter()
            .filter_map(|identifier| groups.remove(&identifier))
            .filter(|group| group.len() > 1)
            .collect()
    }

    fn remove_indices(&mut self, indices: &[usize]) -> usize {
        if indices.is_empty() {
            return 0;
        }
        let before = self.queries.len();
        let mut position = 0;
        self.queries.retain(|_| {
            let keep = !indices.contains(&position);
            position += 1;
            keep
        });
        before - self.queries.len()
    }
}
