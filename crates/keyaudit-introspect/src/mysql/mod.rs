use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use keyaudit_core::{
    CatalogSnapshot, Error, ForeignKeyFact, IndexFact, QualifiedColumn, Result, SchemaInspector,
};

use crate::options::InspectOptions;

mod queries;

/// Inspector for MySQL and MariaDB databases.
///
/// Queries are scoped to the connection's current database unless a schema
/// is configured or the table is schema-qualified.
#[derive(Debug, Clone)]
pub struct MySqlInspector {
    pool: MySqlPool,
    schema: Option<String>,
}

impl MySqlInspector {
    pub fn new(pool: MySqlPool, schema: Option<String>) -> Self {
        Self { pool, schema }
    }

    pub async fn connect(conn: &str, opts: &InspectOptions) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(opts.max_connections)
            .acquire_timeout(opts.acquire_timeout)
            .connect(conn)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;

        let schema = match opts.schemas.as_deref() {
            None | Some([]) => None,
            Some([schema]) => Some(schema.clone()),
            Some(_) => {
                return Err(Error::Unsupported(
                    "mysql inspects a single database per run".to_string(),
                ));
            }
        };
        Ok(Self::new(pool, schema))
    }

    fn scope_for<'a>(&'a self, column: &'a QualifiedColumn) -> Option<&'a str> {
        column.schema_name().or(self.schema.as_deref())
    }

    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let database = match &self.schema {
            Some(schema) => Some(schema.clone()),
            None => queries::fetch_database_name(&self.pool).await?,
        };
        let mut catalog = CatalogSnapshot::new("mysql", database);
        let scope = self.schema.as_deref();

        catalog.foreign_keys = queries::list_foreign_keys(&self.pool, scope)
            .await?
            .into_iter()
            .map(|raw| ForeignKeyFact {
                name: Some(raw.name),
                foreign: QualifiedColumn::new(raw.table, raw.column),
                parent: QualifiedColumn::new(raw.referenced_table, raw.referenced_column),
            })
            .collect();

        let mut indexes: Vec<IndexFact> = Vec::new();
        for raw in queries::list_index_columns(&self.pool, scope).await? {
            match indexes.last_mut() {
                Some(index) if index.name == raw.index_name && index.table == raw.table => {
                    index.columns.push(raw.column);
                }
                _ => indexes.push(IndexFact {
                    is_primary: raw.index_name == "PRIMARY",
                    name: raw.index_name,
                    table: raw.table,
                    columns: vec![raw.column],
                    is_unique: !raw.non_unique,
                }),
            }
        }
        catalog.indexes = indexes;
        catalog.sort();

        Ok(catalog)
    }
}

#[async_trait]
impl SchemaInspector for MySqlInspector {
    fn engine(&self) -> &'static str {
        "mysql"
    }

    async fn constraint_exists(
        &self,
        parent: &QualifiedColumn,
        foreign: &QualifiedColumn,
    ) -> Result<bool> {
        queries::constraint_exists(
            &self.pool,
            self.scope_for(foreign),
            foreign.table_name(),
            &foreign.column,
            parent.table_name(),
            &parent.column,
        )
        .await
    }

    async fn is_indexed(&self, column: &QualifiedColumn) -> Result<bool> {
        queries::is_indexed(
            &self.pool,
            self.scope_for(column),
            column.table_name(),
            &column.column,
        )
        .await
    }
}
