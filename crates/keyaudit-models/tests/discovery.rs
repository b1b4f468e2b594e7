use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use keyaudit_core::{Diagnostic, Error};
use keyaudit_models::{
    DecodeError, Discoverer, EntryKind, FileLister, FsLister, ManifestDecoder, ModelManifest,
    RelationDecl, extract,
};

fn temp_model_root(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("keyaudit_models_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp model root");
    dir
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write fixture");
}

fn seed_models(root: &Path) {
    write(
        root,
        "Invoice.toml",
        r#"
table = "invoices"

[[relations]]
member = "customer"
kind = "belongs_to"
parent = "customers.id"
foreign = "invoices.customer_id"
"#,
    );
    write(
        root,
        "Billing/Statement.json",
        r#"{
  "table": "statements",
  "relations": [
    { "member": "invoices", "kind": "hasMany", "parent": "statements.id", "foreign": "invoices.statement_id" }
  ]
}"#,
    );
    write(root, "Auditable.toml", "abstract = true\n");
    write(root, "Money.toml", "entity = false\n");
    write(root, "Broken.toml", "relations = 3\n");
    write(root, "README.md", "# models\n");
}

fn model_names(root: &Path, dir: Option<&str>) -> Vec<String> {
    Discoverer::new(root)
        .restrict_to(dir.map(PathBuf::from))
        .discover()
        .expect("discover models")
        .models
        .into_iter()
        .map(|model| model.name)
        .collect()
}

#[test]
fn discovers_only_concrete_entities() {
    let root = temp_model_root("concrete");
    seed_models(&root);

    let discovery = Discoverer::new(&root).discover().expect("discover models");
    let names: Vec<&str> = discovery.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Billing::Statement", "Invoice"]);

    let skipped: Vec<&str> = discovery
        .diagnostics
        .iter()
        .filter_map(|diagnostic| match diagnostic {
            Diagnostic::Discovery { path, .. } => Path::new(path).file_name()?.to_str(),
            _ => None,
        })
        .collect();
    assert_eq!(
        skipped,
        vec!["Auditable.toml", "Broken.toml", "Money.toml", "README.md"]
    );

    let abstract_reason = discovery.diagnostics.iter().any(|diagnostic| {
        matches!(diagnostic, Diagnostic::Discovery { reason, .. } if reason == "Auditable is abstract")
    });
    assert!(abstract_reason);

    let records: Vec<String> = discovery
        .models
        .iter()
        .flat_map(|model| extract(model).records)
        .map(|record| format!("{} -> {}", record.foreign, record.parent))
        .collect();
    assert_eq!(
        records,
        vec![
            "invoices.statement_id -> statements.id".to_string(),
            "invoices.customer_id -> customers.id".to_string()
        ]
    );

    fs::remove_dir_all(&root).ok();
}

#[test]
fn dir_restricts_the_scan_but_keeps_names_rooted() {
    let root = temp_model_root("restricted");
    seed_models(&root);

    assert_eq!(model_names(&root, Some("Billing")), vec!["Billing::Statement"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_root_is_a_configuration_error() {
    let root = temp_model_root("missing").join("does-not-exist");

    let err = Discoverer::new(&root).discover().expect_err("missing root");
    assert!(matches!(err, Error::Configuration(message) if message.contains("does not exist")));
}

#[test]
fn missing_dir_under_existing_root_is_a_configuration_error() {
    let root = temp_model_root("missing_dir");

    let result = Discoverer::new(&root)
        .restrict_to(Some(PathBuf::from("Nope")))
        .discover();
    assert!(matches!(result, Err(Error::Configuration(_))));

    fs::remove_dir_all(&root).ok();
}

fn decode_every_file_as_customer(name: &str, _path: &Path) -> Result<ModelManifest, DecodeError> {
    Ok(ModelManifest {
        table: Some(name.to_lowercase()),
        relations: vec![RelationDecl {
            member: "account".to_string(),
            kind: "belongs_to".to_string(),
            parent: Some("accounts.id".to_string()),
            foreign: Some("customers.account_id".to_string()),
            declared_on: None,
        }],
        ..ModelManifest::default()
    })
}

#[test]
fn accepts_an_injected_decoder() {
    let root = temp_model_root("decoder");
    write(&root, "Customer.rb", "class Customer; end\n");

    let discovery = Discoverer::with_parts(&root, FsLister, decode_every_file_as_customer)
        .discover()
        .expect("discover models");
    assert_eq!(discovery.models.len(), 1);
    assert_eq!(discovery.models[0].name, "Customer");
    assert_eq!(extract(&discovery.models[0]).records[0].member, "account");

    fs::remove_dir_all(&root).ok();
}

/// Filesystem lister that cannot open directories named `Locked`.
struct LockedSubtree;

impl FileLister for LockedSubtree {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
        if dir.file_name().is_some_and(|name| name == "Locked") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        FsLister.read_dir(dir)
    }
}

#[test]
fn unreadable_subdirectory_is_skipped_with_a_diagnostic() {
    let root = temp_model_root("locked");
    seed_models(&root);
    write(&root, "Locked/Secret.toml", "table = \"secrets\"\n");

    let discovery = Discoverer::with_parts(&root, LockedSubtree, ManifestDecoder)
        .discover()
        .expect("discover models");

    let names: Vec<&str> = discovery.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Billing::Statement", "Invoice"]);
    assert!(discovery.diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        Diagnostic::Discovery { path, reason }
            if path.ends_with("Locked") && reason.contains("permission denied")
    )));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn unreadable_root_is_still_an_error() {
    let root = temp_model_root("locked_root").join("Locked");
    fs::create_dir_all(&root).expect("create locked root");

    let result = Discoverer::with_parts(&root, LockedSubtree, ManifestDecoder).discover();
    assert!(matches!(result, Err(Error::Io(_))));

    fs::remove_dir_all(root.parent().expect("parent")).ok();
}
