use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Insertion-ordered mapping of label to signed count.
///
/// Used for aggregated row counts and for diffs alike. Iteration order is
/// the order labels were first inserted, which is what the bar chart and
/// the json output follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    entries: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `label` to `value`, keeping its original position if present.
    pub fn insert(&mut self, label: &str, value: i64) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 = value,
            None => self.push(label, value),
        }
    }

    /// Add `value` to the running total for `label`.
    pub fn add(&mut self, label: &str, value: i64) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 = self.entries[i].1.saturating_add(value),
            None => self.push(label, value),
        }
    }

    fn push(&mut self, label: &str, value: i64) {
        self.index.insert(label.to_string(), self.entries.len());
        self.entries.push((label.to_string(), value));
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.index.get(label).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.entries.iter().map(|(label, value)| (label.as_str(), *value))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }
}

impl<S: AsRef<str>> FromIterator<(S, i64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (label, value) in iter {
            counts.insert(label.as_ref(), value);
        }
        counts
    }
}

impl Serialize for Counts {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self.iter())
    }
}
