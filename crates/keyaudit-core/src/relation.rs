use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `table.column` reference. The table may itself be schema-qualified.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Both the table and the column are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.table.trim().is_empty() && !self.column.trim().is_empty()
    }

    /// Table name without any schema prefix.
    pub fn table_name(&self) -> &str {
        self.table
            .rsplit_once('.')
            .map(|(_, table)| table)
            .unwrap_or(&self.table)
    }

    /// Schema prefix of the table, when one was declared.
    pub fn schema_name(&self) -> Option<&str> {
        self.table.rsplit_once('.').map(|(schema, _)| schema)
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Returned when a key reference has no `.` separator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected `table.column`, got `{0}`")]
pub struct ParseColumnError(pub String);

impl FromStr for QualifiedColumn {
    type Err = ParseColumnError;

    /// Splits on the last `.`, so `app.invoices.customer_id` keeps
    /// `app.invoices` as the table.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let Some((table, column)) = raw.rsplit_once('.') else {
            return Err(ParseColumnError(raw.to_string()));
        };
        Ok(Self::new(table.trim(), column.trim()))
    }
}

/// Relationship variants a model can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsToMany => "belongs_to_many",
        }
    }

    /// Parse a declared kind, accepting `belongs_to`, `belongsTo` and `BelongsTo`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "belongsto" => Some(RelationKind::BelongsTo),
            "hasone" => Some(RelationKind::HasOne),
            "hasmany" => Some(RelationKind::HasMany),
            "belongstomany" => Some(RelationKind::BelongsToMany),
            _ => None,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed relationship declaration: the member that declares it plus the
/// parent key and the foreign key it links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub member: String,
    pub kind: RelationKind,
    pub parent: QualifiedColumn,
    pub foreign: QualifiedColumn,
}

impl Relationship {
    pub fn new(
        member: impl Into<String>,
        kind: RelationKind,
        parent: QualifiedColumn,
        foreign: QualifiedColumn,
    ) -> Self {
        Self {
            member: member.into(),
            kind,
            parent,
            foreign,
        }
    }

    pub fn belongs_to(member: &str, parent: &str, foreign: &str) -> Result<Self, ParseColumnError> {
        Ok(Self::new(
            member,
            RelationKind::BelongsTo,
            parent.parse()?,
            foreign.parse()?,
        ))
    }

    pub fn has_many(member: &str, parent: &str, foreign: &str) -> Result<Self, ParseColumnError> {
        Ok(Self::new(
            member,
            RelationKind::HasMany,
            parent.parse()?,
            foreign.parse()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_on_last_separator() {
        let column: QualifiedColumn = "app.invoices.customer_id".parse().unwrap();
        assert_eq!(column.table, "app.invoices");
        assert_eq!(column.column, "customer_id");
        assert_eq!(column.table_name(), "invoices");
        assert_eq!(column.schema_name(), Some("app"));
    }

    #[test]
    fn rejects_unqualified_names() {
        let err = "customer_id".parse::<QualifiedColumn>().unwrap_err();
        assert_eq!(err, ParseColumnError("customer_id".to_string()));
    }

    #[test]
    fn empty_parts_parse_but_are_incomplete() {
        let column: QualifiedColumn = "invoices.".parse().unwrap();
        assert!(!column.is_complete());
        let column: QualifiedColumn = ".id".parse().unwrap();
        assert!(!column.is_complete());
    }

    #[test]
    fn relation_kind_accepts_common_spellings() {
        assert_eq!(
            RelationKind::from_name("belongsTo"),
            Some(RelationKind::BelongsTo)
        );
        assert_eq!(
            RelationKind::from_name("has_many"),
            Some(RelationKind::HasMany)
        );
        assert_eq!(
            RelationKind::from_name("BelongsToMany"),
            Some(RelationKind::BelongsToMany)
        );
        assert_eq!(RelationKind::from_name("scope"), None);
    }
}
