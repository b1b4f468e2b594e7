use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use keyaudit_core::{
    CatalogSnapshot, Error, ForeignKeyFact, IndexFact, QualifiedColumn, Result, SchemaInspector,
};

use crate::options::InspectOptions;

mod queries;

/// Inspector for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresInspector {
    pool: PgPool,
    schemas: Vec<String>,
}

impl PostgresInspector {
    /// Create an inspector over a pre-configured pool and an explicit schema list.
    pub fn new(pool: PgPool, schemas: Vec<String>) -> Self {
        Self { pool, schemas }
    }

    /// Connect and resolve the schema scope, falling back to the
    /// connection's search path when no schemas are configured.
    pub async fn connect(conn: &str, opts: &InspectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(opts.max_connections)
            .acquire_timeout(opts.acquire_timeout)
            .connect(conn)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Self::from_pool(pool, opts).await
    }

    pub async fn from_pool(pool: PgPool, opts: &InspectOptions) -> Result<Self> {
        let schemas = match &opts.schemas {
            Some(schemas) if !schemas.is_empty() => schemas.clone(),
            _ => queries::current_schemas(&pool).await?,
        };
        tracing::debug!(event = "postgres_scope_resolved", schemas = ?schemas);
        Ok(Self::new(pool, schemas))
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    // An explicitly schema-qualified table overrides the configured scope.
    fn scope_for(&self, column: &QualifiedColumn) -> Vec<String> {
        match column.schema_name() {
            Some(schema) => vec![schema.to_string()],
            None => self.schemas.clone(),
        }
    }

    /// Capture every foreign key and index in scope.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let database = queries::fetch_database_name(&self.pool).await?;
        let mut catalog = CatalogSnapshot::new("postgres", Some(database));

        catalog.foreign_keys = queries::list_foreign_keys(&self.pool, &self.schemas)
            .await?
            .into_iter()
            .map(|raw| ForeignKeyFact {
                name: Some(raw.name),
                foreign: QualifiedColumn::new(raw.table, raw.column),
                parent: QualifiedColumn::new(raw.referenced_table, raw.referenced_column),
            })
            .collect();
        catalog.indexes = queries::list_indexes(&self.pool, &self.schemas)
            .await?
            .into_iter()
            .map(|raw| IndexFact {
                name: raw.name,
                table: raw.table,
                columns: raw.columns,
                is_unique: raw.is_unique,
                is_primary: raw.is_primary,
            })
            .collect();
        catalog.sort();

        Ok(catalog)
    }
}

#[async_trait]
impl SchemaInspector for PostgresInspector {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn constraint_exists(
        &self,
        parent: &QualifiedColumn,
        foreign: &QualifiedColumn,
    ) -> Result<bool> {
        queries::constraint_exists(
            &self.pool,
            &self.scope_for(foreign),
            foreign.table_name(),
            &foreign.column,
            parent.schema_name(),
            parent.table_name(),
            &parent.column,
        )
        .await
    }

    async fn is_indexed(&self, column: &QualifiedColumn) -> Result<bool> {
        queries::is_indexed(
            &self.pool,
            &self.scope_for(column),
            column.table_name(),
            &column.column,
        )
        .await
    }
}
