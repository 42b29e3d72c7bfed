//! Discrete character states and the per-leaf trait table.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use chromrec_core::Summarizable;

/// An observed or reconstructed discrete character state.
///
/// The derived order is the tie-break rule used whenever a single state has
/// to be picked from a candidate set: every count sorts before every label,
/// counts ascend numerically and labels ascend lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum State {
    /// Integer-valued state, e.g. a haploid chromosome count.
    Count(i64),
    /// Any other categorical state.
    Label(String),
}

impl State {
    /// Interpret a raw field: integers become counts, anything else a label.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        match field.parse::<i64>() {
            Ok(n) => Self::Count(n),
            Err(_) => Self::Label(field.to_string()),
        }
    }

    /// Magnitude of a change between two states.
    ///
    /// Counts differ by their absolute difference; any other pair differs by
    /// 1 when unequal.
    pub fn distance(&self, other: &State) -> u64 {
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => a.abs_diff(*b),
            (a, b) if a == b => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for State {
    fn from(n: i64) -> Self {
        Self::Count(n)
    }
}

impl From<i32> for State {
    fn from(n: i32) -> Self {
        Self::Count(i64::from(n))
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

/// Mapping from leaf name to one observed state (a single trait column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitTable {
    states: BTreeMap<String, State>,
}

impl TraitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the state of `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, state: impl Into<State>) -> Option<State> {
        self.states.insert(name.into(), state.into())
    }

    pub fn get(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Leaf names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// `(name, state)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, State> {
        self.states.iter()
    }
}

impl<K, S> FromIterator<(K, S)> for TraitTable
where
    K: Into<String>,
    S: Into<State>,
{
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, state) in iter {
            table.insert(name, state);
        }
        table
    }
}

impl<'a> IntoIterator for &'a TraitTable {
    type Item = (&'a String, &'a State);
    type IntoIter = btree_map::Iter<'a, String, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Summarizable for TraitTable {
    fn summary(&self) -> String {
        let mut distinct: Vec<&State> = self.states.values().collect();
        distinct.sort();
        distinct.dedup();
        format!(
            "TraitTable: {} taxa, {} distinct states",
            self.len(),
            distinct.len()
        )
    }
}
