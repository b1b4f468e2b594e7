use std::time::Duration;

/// Options that control how inspectors connect and scope their queries.
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Schemas to search. `None` means the connection's search path
    /// (Postgres) or current database (MySQL).
    pub schemas: Option<Vec<String>>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            schemas: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}
