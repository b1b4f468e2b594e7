use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::relation::{QualifiedColumn, RelationKind, Relationship};

/// A relationship captured from a model, annotated with the schema facts
/// found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipRecord {
    /// Canonical name of the model that declares the relationship.
    pub model: String,
    pub member: String,
    pub kind: RelationKind,
    pub parent: QualifiedColumn,
    pub foreign: QualifiedColumn,
    pub constraint_exists: bool,
    pub is_indexed: bool,
    /// Other members collapsed into this record because they share its
    /// foreign column (index mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
}

impl RelationshipRecord {
    /// Create an unchecked record; both schema facts start out absent.
    pub fn new(model: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            model: model.into(),
            member: relationship.member,
            kind: relationship.kind,
            parent: relationship.parent,
            foreign: relationship.foreign,
            constraint_exists: false,
            is_indexed: false,
            shared_with: Vec::new(),
        }
    }

    /// The declaring member followed by every member collapsed into it.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.member.as_str()).chain(self.shared_with.iter().map(String::as_str))
    }

    /// Both key sides carry a table and a column.
    pub fn is_complete(&self) -> bool {
        self.parent.is_complete() && self.foreign.is_complete()
    }
}
