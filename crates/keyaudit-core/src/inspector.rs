use async_trait::async_trait;

use crate::error::Result;
use crate::relation::QualifiedColumn;

/// Read-only access to the constraint and index catalogs of the database the
/// connection is bound to.
#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Whether a referential constraint links `foreign` to `parent`.
    async fn constraint_exists(
        &self,
        parent: &QualifiedColumn,
        foreign: &QualifiedColumn,
    ) -> Result<bool>;

    /// Whether any index on the table contains the column.
    async fn is_indexed(&self, column: &QualifiedColumn) -> Result<bool>;
}
