use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inspector::SchemaInspector;
use crate::relation::QualifiedColumn;

/// Current contract version for `catalog.json` snapshots.
pub const CATALOG_VERSION: &str = "0.1";

/// Point-in-time copy of the foreign key and index catalogs.
///
/// Table names are stored unqualified; lookups compare against the
/// unqualified name of the declared table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSnapshot {
    pub catalog_version: String,
    pub engine: String,
    pub database: Option<String>,
    pub foreign_keys: Vec<ForeignKeyFact>,
    pub indexes: Vec<IndexFact>,
}

/// One column pair of a referential constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyFact {
    pub name: Option<String>,
    /// Referencing side.
    pub foreign: QualifiedColumn,
    /// Referenced side.
    pub parent: QualifiedColumn,
}

/// Index definition with its key columns in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexFact {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

impl CatalogSnapshot {
    pub fn new(engine: impl Into<String>, database: Option<String>) -> Self {
        Self {
            catalog_version: CATALOG_VERSION.to_string(),
            engine: engine.into(),
            database,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_foreign_key(mut self, parent: &str, foreign: &str) -> Self {
        if let (Ok(parent), Ok(foreign)) = (parent.parse(), foreign.parse()) {
            self.foreign_keys.push(ForeignKeyFact {
                name: None,
                foreign,
                parent,
            });
        }
        self
    }

    pub fn with_index(mut self, name: &str, table: &str, columns: &[&str]) -> Self {
        self.indexes.push(IndexFact {
            name: name.to_string(),
            table: table.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            is_unique: false,
            is_primary: false,
        });
        self
    }

    pub fn has_constraint(&self, parent: &QualifiedColumn, foreign: &QualifiedColumn) -> bool {
        self.foreign_keys.iter().any(|fk| {
            fk.foreign.table_name() == foreign.table_name()
                && fk.foreign.column == foreign.column
                && fk.parent.table_name() == parent.table_name()
                && fk.parent.column == parent.column
        })
    }

    pub fn has_index(&self, column: &QualifiedColumn) -> bool {
        self.indexes.iter().any(|index| {
            index.table == column.table_name()
                && index.columns.iter().any(|name| *name == column.column)
        })
    }

    /// Order facts so that snapshots of the same schema serialize identically.
    pub fn sort(&mut self) {
        self.foreign_keys.sort_by(|left, right| {
            left.foreign
                .cmp(&right.foreign)
                .then_with(|| left.parent.cmp(&right.parent))
                .then_with(|| left.name.cmp(&right.name))
        });
        self.indexes.sort_by(|left, right| {
            left.table
                .cmp(&right.table)
                .then_with(|| left.name.cmp(&right.name))
        });
    }
}

#[async_trait]
impl SchemaInspector for CatalogSnapshot {
    fn engine(&self) -> &'static str {
        "snapshot"
    }

    async fn constraint_exists(
        &self,
        parent: &QualifiedColumn,
        foreign: &QualifiedColumn,
    ) -> Result<bool> {
        Ok(self.has_constraint(parent, foreign))
    }

    async fn is_indexed(&self, column: &QualifiedColumn) -> Result<bool> {
        Ok(self.has_index(column))
    }
}
