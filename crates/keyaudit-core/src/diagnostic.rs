use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Recoverable conditions met during a run. None of them stops the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A file under the model root is not a usable concrete model.
    Discovery { path: String, reason: String },
    /// A declared member did not yield a relationship record.
    Extraction {
        model: String,
        member: String,
        reason: String,
    },
    /// An introspection query failed; the property was treated as absent.
    SchemaQuery { subject: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Discovery { path, reason } => write!(f, "{path} is not a model: {reason}"),
            Diagnostic::Extraction {
                model,
                member,
                reason,
            } => write!(f, "{model}::{member} skipped: {reason}"),
            Diagnostic::SchemaQuery { subject, reason } => {
                write!(f, "schema query for {subject} failed: {reason}")
            }
        }
    }
}
