//! Catalog inspectors backed by live database connections.

pub mod engine;
pub mod mysql;
pub mod options;
pub mod postgres;

pub use engine::{Engine, LiveInspector, connect, connect_or_unavailable};
pub use mysql::MySqlInspector;
pub use options::InspectOptions;
pub use postgres::PostgresInspector;

pub use keyaudit_core::{CatalogSnapshot, SchemaInspector};
