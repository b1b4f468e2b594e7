//! Core contracts for keyaudit.
//!
//! This crate defines the relationship records, check kinds, suppression
//! handling, the `SchemaInspector` seam and the auditor that classifies
//! records into a deterministic report.

pub mod audit;
pub mod catalog;
pub mod check;
pub mod diagnostic;
pub mod error;
pub mod inspector;
pub mod record;
pub mod relation;
pub mod report;
pub mod suppression;

pub use audit::{Verbosity, audit, dedup_records, sort_records};
pub use catalog::{CATALOG_VERSION, CatalogSnapshot, ForeignKeyFact, IndexFact};
pub use check::CheckKind;
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use inspector::SchemaInspector;
pub use record::RelationshipRecord;
pub use relation::{ParseColumnError, QualifiedColumn, RelationKind, Relationship};
pub use report::{AuditReport, ReportEntry, ReportSummary, Status, classify};
pub use suppression::SuppressionList;
