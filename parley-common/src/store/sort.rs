//! Store orderings
//!
//! Topological ordering uses Kahn's algorithm with a min-heap on the original
//! position, so independent queries keep their relative order and sorting an
//! already ordered store is a no-op.

use super::{QueryStore, SortKey};
use crate::query::{Query, QueryRef};
use crate::{Error, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, warn};

fn compare(a: &Query, b: &Query, key: SortKey) -> Ordering {
    match key {
        SortKey::SentTime => a.sent_time().cmp(&b.sent_time()),
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Identifier => a.identifier().cmp(&b.identifier()),
        SortKey::Question => a.question().cmp(&b.question()),
        SortKey::Sender => a.sender().cmp(b.sender()),
        SortKey::Recipient => a.recipient().cmp(b.recipient()),
    }
}

/// Stable sort of query handles; unsent queries sort before sent ones
pub(crate) fn sort_by_key(queries: &mut [QueryRef], key: SortKey) {
    queries.sort_by(|a, b| compare(&a.borrow(), &b.borrow(), key));
}

impl QueryStore {
    /// Reorder by sent time, oldest first
    pub fn chronological_sort(&mut self) {
        sort_by_key(&mut self.queries, SortKey::SentTime);
    }

    /// Reorder so every query comes after its prerequisites.
    ///
    /// Prerequisites that are not in this store impose no ordering. Among
    /// queries ready at the same time the one stored first goes first. On a
    /// cycle the store is left untouched.
    pub fn topological_sort(&mut self) -> Result<()> {
        let n = self.queries.len();
        if n == 0 {
            return Ok(());
        }

        // First position of each stored query object
        let mut position: HashMap<*const _, usize> = HashMap::new();
        for (index, query) in self.queries.iter().enumerate() {
            position.entry(query.as_ptr()).or_insert(index);
        }

        // dependents[i] = queries waiting on query i
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut unresolved: Vec<usize> = vec![0; n];
        for (index, query) in self.queries.iter().enumerate() {
            for prerequisite in query.borrow().prerequisites() {
                if let Some(&before) = position.get(&prerequisite.as_ptr()) {
                    dependents[before].push(index);
                    unresolved[index] += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = unresolved
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(index, _)| Reverse(index))
            .collect();

        let mut order: Vec<usize> = Vec::with_capacity(n);
        while let Some(Reverse(index)) = ready.pop() {
            order.push(index);
            for &dependent in &dependents[index] {
                unresolved[dependent] -= 1;
                if unresolved[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() != n {
            let stuck: Vec<String> = (0..n)
                .filter(|index| unresolved[*index] > 0)
                .map(|index| self.queries[index].name())
                .collect();
            warn!(
                "{} cannot order queries, circular dependency between: {}",
                self.owner,
                stuck.join(", ")
            );
            return Err(Error::CircularDependency(stuck));
        }

        let sorted: Vec<QueryRef> = order.iter().map(|index| self.queries[*index].clone()).collect();
        self.queries = sorted;
        debug!("{} ordered {} queries by prerequisites", self.owner, n);
        Ok(())
    }
}
