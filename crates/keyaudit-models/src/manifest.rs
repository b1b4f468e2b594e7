use serde::{Deserialize, Serialize};

/// On-disk declaration of one model.
///
/// ```toml
/// table = "invoices"
///
/// [[relations]]
/// member = "customer"
/// kind = "belongs_to"
/// parent = "customers.id"
/// foreign = "invoices.customer_id"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Backing table, used for progress output only.
    #[serde(default)]
    pub table: Option<String>,
    /// Abstract bases are never audited themselves.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Whether the model is a persistent entity at all.
    #[serde(default = "default_entity")]
    pub entity: bool,
    #[serde(default)]
    pub relations: Vec<RelationDecl>,
}

fn default_entity() -> bool {
    true
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self {
            table: None,
            is_abstract: false,
            entity: default_entity(),
            relations: Vec::new(),
        }
    }
}

/// A relationship member as written in a manifest. Fields are loose so one
/// bad declaration skips that member instead of the whole model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDecl {
    pub member: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub foreign: Option<String>,
    /// Model that originally declared the member, when copied from a base.
    #[serde(default)]
    pub declared_on: Option<String>,
}
