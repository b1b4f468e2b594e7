use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::record::RelationshipRecord;

/// Which schema property a pass of the auditor verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Constraint,
    Index,
}

impl CheckKind {
    pub const ALL: [CheckKind; 2] = [CheckKind::Constraint, CheckKind::Index];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Constraint => "constraint",
            CheckKind::Index => "index",
        }
    }

    /// Identity of a record in this mode, also used as its sort key.
    ///
    /// Constraint mode keys on `(parent table, member)`. Index mode keys on
    /// the foreign column alone: an index belongs to the column, so every
    /// relationship sharing it collapses into one entry.
    pub fn key<'a>(&self, record: &'a RelationshipRecord) -> (&'a str, &'a str) {
        match self {
            CheckKind::Constraint => (record.parent.table.as_str(), record.member.as_str()),
            CheckKind::Index => (record.foreign.table.as_str(), record.foreign.column.as_str()),
        }
    }

    /// Human-facing subject of a report line.
    pub fn subject(&self, record: &RelationshipRecord) -> String {
        match self {
            CheckKind::Constraint => format!("{}: {}", record.member, record.parent),
            CheckKind::Index => record.foreign.to_string(),
        }
    }

    /// The `member: table.column` string matched against the suppression list.
    pub fn suppression_key(&self, record: &RelationshipRecord) -> String {
        match self {
            CheckKind::Constraint => format!("{}: {}", record.member, record.parent),
            CheckKind::Index => format!("{}: {}", record.member, record.foreign),
        }
    }

    /// Every suppression key that covers the record. In index mode each
    /// member sharing the foreign column contributes one.
    pub fn suppression_keys(&self, record: &RelationshipRecord) -> Vec<String> {
        match self {
            CheckKind::Constraint => vec![self.suppression_key(record)],
            CheckKind::Index => record
                .members()
                .map(|member| format!("{member}: {}", record.foreign))
                .collect(),
        }
    }

    pub fn result(&self, record: &RelationshipRecord) -> bool {
        match self {
            CheckKind::Constraint => record.constraint_exists,
            CheckKind::Index => record.is_indexed,
        }
    }

    pub fn set_result(&self, record: &mut RelationshipRecord, present: bool) {
        match self {
            CheckKind::Constraint => record.constraint_exists = present,
            CheckKind::Index => record.is_indexed = present,
        }
    }

    pub fn message(&self, record: &RelationshipRecord, present: bool) -> String {
        let subject = self.subject(record);
        match (self, present) {
            (CheckKind::Constraint, true) => format!("{subject} has a foreign key constraint"),
            (CheckKind::Constraint, false) => format!("{subject} has no foreign key constraint"),
            (CheckKind::Index, true) => format!("{subject} is indexed"),
            (CheckKind::Index, false) => format!("{subject} is not indexed"),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "constraint" | "fk" => Ok(CheckKind::Constraint),
            "index" => Ok(CheckKind::Index),
            other => Err(format!("unknown check kind: {other}")),
        }
    }
}
