use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Where a token was first seen: page index, then token index within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub page: usize,
    pub token: usize,
}

impl Position {
    pub fn new(page: usize, token: usize) -> Self { Self { page, token } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub count: u64,
    pub first_seen: Position,
}

/// Token -> occurrence count.
///
/// Every entry remembers the earliest position it was recorded at. Merging
/// sums counts and keeps the earlier position, so the result of folding a set
/// of tables does not depend on the order they are folded in, and neither
/// does the tie-break used by [`FrequencyTable::ranked`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    entries: HashMap<String, Entry>,
}

impl FrequencyTable {
    pub fn new() -> Self { Self::default() }

    /// Build a table from (token, count) pairs; iteration order becomes the
    /// first-encountered order.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (i, (token, count)) in counts.into_iter().enumerate() {
            table.add(token.into(), count, Position::new(0, i));
        }
        table
    }

    /// Count one occurrence of `token` at `at`.
    pub fn record(&mut self, token: &str, at: Position) {
        match self.entries.get_mut(token) {
            Some(entry) => {
                entry.count += 1;
                entry.first_seen = entry.first_seen.min(at);
            }
            None => {
                self.entries.insert(token.to_string(), Entry { count: 1, first_seen: at });
            }
        }
    }

    pub fn add(&mut self, token: String, count: u64, first_seen: Position) {
        let entry = self.entries.entry(token).or_insert(Entry { count: 0, first_seen });
        entry.count += count;
        entry.first_seen = entry.first_seen.min(first_seen);
    }

    /// Token-wise sum of `other` into `self`.
    pub fn merge(&mut self, other: FrequencyTable) {
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        for (token, entry) in other.entries {
            self.add(token, entry.count, entry.first_seen);
        }
    }

    pub fn get(&self, token: &str) -> Option<u64> { self.entries.get(token).map(|e| e.count) }

    pub fn entry(&self, token: &str) -> Option<&Entry> { self.entries.get(token) }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Sum of all counts.
    pub fn total(&self) -> u64 { self.entries.values().map(|e| e.count).sum() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain token -> count view, handy for comparisons.
    pub fn counts(&self) -> HashMap<String, u64> {
        self.entries.iter().map(|(k, v)| (k.clone(), v.count)).collect()
    }

    /// All entries by descending count; equal counts keep first-encountered order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut items: Vec<(&str, &Entry)> = self.iter().collect();
        items.sort_by(|a, b| compare_rank(a.1, b.1));
        items.into_iter().map(|(t, e)| (t, e.count)).collect()
    }
}

fn compare_rank(a: &Entry, b: &Entry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.first_seen.cmp(&b.first_seen))
}
