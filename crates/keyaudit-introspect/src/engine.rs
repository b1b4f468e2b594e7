use async_trait::async_trait;

use keyaudit_core::{CatalogSnapshot, Error, QualifiedColumn, Result, SchemaInspector};

use crate::mysql::MySqlInspector;
use crate::options::InspectOptions;
use crate::postgres::PostgresInspector;

/// Database engines with a live inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Postgres,
    MySql,
}

impl Engine {
    /// Detect the engine from the connection string scheme.
    pub fn detect(conn: &str) -> Result<Self> {
        if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
            Ok(Engine::Postgres)
        } else if conn.starts_with("mysql://") || conn.starts_with("mariadb://") {
            Ok(Engine::MySql)
        } else {
            Err(Error::Unsupported(format!(
                "unsupported engine in connection string (expected postgres:// or mysql://): {}",
                conn.split("://").next().unwrap_or_default()
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MySql => "mysql",
        }
    }
}

/// Inspector bound to a live connection pool.
///
/// `Unavailable` stands in when no connection could be opened: every query
/// fails with the connection error, so each check resolves to absent.
#[derive(Debug, Clone)]
pub enum LiveInspector {
    Postgres(PostgresInspector),
    MySql(MySqlInspector),
    Unavailable(String),
}

/// Connect to the database named by `conn` and return its inspector.
pub async fn connect(conn: &str, opts: &InspectOptions) -> Result<LiveInspector> {
    let engine = Engine::detect(conn)?;
    tracing::info!(event = "engine_detected", engine = engine.as_str());

    match engine {
        // mariadb:// is not a scheme sqlx understands.
        Engine::MySql if conn.starts_with("mariadb://") => {
            let conn = conn.replacen("mariadb://", "mysql://", 1);
            Ok(LiveInspector::MySql(MySqlInspector::connect(&conn, opts).await?))
        }
        Engine::MySql => Ok(LiveInspector::MySql(MySqlInspector::connect(conn, opts).await?)),
        Engine::Postgres => Ok(LiveInspector::Postgres(
            PostgresInspector::connect(conn, opts).await?,
        )),
    }
}

/// Like [`connect`], but an unsupported engine or a failed connection yields
/// [`LiveInspector::Unavailable`] instead of an error.
pub async fn connect_or_unavailable(conn: &str, opts: &InspectOptions) -> LiveInspector {
    match connect(conn, opts).await {
        Ok(inspector) => inspector,
        Err(err) => {
            tracing::warn!(event = "inspector_unavailable", error = %err);
            LiveInspector::Unavailable(err.to_string())
        }
    }
}

impl LiveInspector {
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        match self {
            LiveInspector::Postgres(inspector) => inspector.snapshot().await,
            LiveInspector::MySql(inspector) => inspector.snapshot().await,
            LiveInspector::Unavailable(reason) => Err(Error::Db(reason.clone())),
        }
    }

    fn inner(&self) -> Result<&dyn SchemaInspector> {
        match self {
            LiveInspector::Postgres(inspector) => Ok(inspector),
            LiveInspector::MySql(inspector) => Ok(inspector),
            LiveInspector::Unavailable(reason) => Err(Error::Db(reason.clone())),
        }
    }
}

#[async_trait]
impl SchemaInspector for LiveInspector {
    fn engine(&self) -> &'static str {
        match self.inner() {
            Ok(inspector) => inspector.engine(),
            Err(_) => "unavailable",
        }
    }

    async fn constraint_exists(
        &self,
        parent: &QualifiedColumn,
        foreign: &QualifiedColumn,
    ) -> Result<bool> {
        self.inner()?.constraint_exists(parent, foreign).await
    }

    async fn is_indexed(&self, column: &QualifiedColumn) -> Result<bool> {
        self.inner()?.is_indexed(column).await
    }
}
