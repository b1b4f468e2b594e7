use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use keyaudit_core::{AuditReport, CheckKind};

use crate::redact::RedactedConnection;

use super::{RegistryError, RegistryResult};

/// Metadata captured when an audit run starts.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    pub run_id: String,
    #[serde(skip)]
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub run_dir: PathBuf,
    pub models_root: PathBuf,
    pub dir: Option<PathBuf>,
    pub checks: Vec<CheckKind>,
    pub strict: bool,
    pub suppressions: Vec<String>,
    /// Live connection, redacted. `None` when auditing a catalog snapshot.
    pub connection: Option<RedactedConnection>,
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    started_at: String,
    #[serde(flatten)]
    context: &'a RunContext,
    git: GitInfo,
}

#[derive(Debug, Serialize)]
struct GitInfo {
    commit: Option<String>,
    dirty: Option<bool>,
}

/// Artifact locations inside one run directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub report_path: PathBuf,
    pub logs_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__run_<id>/` and write `config.json`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));
    create_dir_all(&root)?;

    let paths = RunPaths {
        config_path: root.join("config.json"),
        report_path: root.join("report.json"),
        logs_path: root.join("logs.ndjson"),
        root,
    };

    let config = RunConfig {
        started_at: ctx.started_at.to_rfc3339(),
        context: ctx,
        git: collect_git_info(),
    };
    write_json(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_reports(paths: &RunPaths, reports: &[AuditReport]) -> RegistryResult<()> {
    write_json(&paths.report_path, &reports)
}

/// Write pretty JSON, creating the parent directory when needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_directory_holds_config_and_log_file() {
        let run_dir = std::env::temp_dir().join(format!("keyaudit_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: Utc::now(),
            run_dir: run_dir.clone(),
            models_root: PathBuf::from("app/Models"),
            dir: None,
            checks: vec![CheckKind::Constraint],
            strict: false,
            suppressions: Vec::new(),
            connection: Some(crate::redact::redact_connection("postgres://app:pw@localhost/shop")),
            catalog: None,
        };

        let paths = start_run(&ctx).expect("start run");
        assert!(paths.root.ends_with(format!(
            "{}__run_abc",
            ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ")
        )));
        assert!(paths.logs_path.exists());

        let config = std::fs::read_to_string(&paths.config_path).expect("read config");
        assert!(config.contains("\"run_id\": \"abc\""));
        assert!(config.contains("app:***@localhost"));
        assert!(!config.contains(":pw@"));

        std::fs::remove_dir_all(&run_dir).ok();
    }
}
