use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Operator-supplied `member: table.column` entries whose missing property is
/// acknowledged. A suppressed FAIL is reported as WARN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SuppressionList {
    entries: BTreeSet<String>,
}

impl SuppressionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        list.extend(entries);
        list
    }

    pub fn insert(&mut self, entry: impl AsRef<str>) -> bool {
        let entry = normalize(entry.as_ref());
        if entry.is_empty() {
            return false;
        }
        self.entries.insert(entry)
    }

    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(&normalize(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

// `member:table.column` and `member :  table.column` both become `member: table.column`.
fn normalize(entry: &str) -> String {
    match entry.split_once(':') {
        Some((member, key)) => format!("{}: {}", member.trim(), key.trim()),
        None => entry.trim().to_string(),
    }
}
