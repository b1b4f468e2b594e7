use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use keyaudit_core::{
    AuditReport, CATALOG_VERSION, CatalogSnapshot, CheckKind, Diagnostic, RelationshipRecord,
    SchemaInspector, SuppressionList, Verbosity, audit,
};
use keyaudit_introspect::LiveInspector;
use keyaudit_models::{Discoverer, extract};
use schemars::schema_for;
use serde_json::Value;

use crate::error::CliError;
use crate::output::Console;

/// Stages of one audit run. `Aborted` is only reachable from `Discovering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Discovering,
    Extracting,
    Checking,
    Reporting,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Discovering => "discovering",
            Stage::Extracting => "extracting",
            Stage::Checking => "checking",
            Stage::Reporting => "reporting",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub model_root: PathBuf,
    pub dir: Option<PathBuf>,
    pub checks: Vec<CheckKind>,
    pub suppression: SuppressionList,
    pub verbosity: Verbosity,
}

/// Output of discovery and extraction.
#[derive(Debug, Default)]
pub struct Collected {
    pub models: usize,
    pub records: Vec<RelationshipRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Answers schema questions from a live database or a saved catalog.
pub enum InspectorSource {
    Live(LiveInspector),
    Snapshot(CatalogSnapshot),
}

impl InspectorSource {
    pub fn inspector(&self) -> &dyn SchemaInspector {
        match self {
            InspectorSource::Live(inspector) => inspector,
            InspectorSource::Snapshot(snapshot) => snapshot,
        }
    }
}

/// Read a catalog written by `keyaudit catalog`, validating it against the
/// snapshot JSON Schema first.
pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot, CliError> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    validate_catalog_json(&value)
        .map_err(|issues| CliError::InvalidConfig(format!("{}: {issues}", path.display())))?;

    let snapshot: CatalogSnapshot = serde_json::from_value(value)?;
    if snapshot.catalog_version != CATALOG_VERSION {
        return Err(CliError::InvalidConfig(format!(
            "{} has catalog version {}, expected {CATALOG_VERSION}",
            path.display(),
            snapshot.catalog_version
        )));
    }
    tracing::info!(
        event = "catalog_loaded",
        path = %path.display(),
        foreign_keys = snapshot.foreign_keys.len(),
        indexes = snapshot.indexes.len()
    );
    Ok(snapshot)
}

fn validate_catalog_json(value: &Value) -> Result<(), String> {
    let schema = serde_json::to_value(schema_for!(CatalogSnapshot)).map_err(|err| err.to_string())?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| err.to_string())?;

    if let Err(errors) = compiled.validate(value) {
        let issues: Vec<String> = errors
            .map(|error| format!("{} at `{}`", error, error.instance_path))
            .collect();
        return Err(issues.join("; "));
    }
    Ok(())
}

/// Sequential audit run: discover, extract, check, report.
pub struct Pipeline<'a> {
    settings: AuditSettings,
    console: &'a mut Console,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: AuditSettings, console: &'a mut Console) -> Self {
        Self {
            settings,
            console,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, next: Stage) {
        tracing::info!(event = "stage_entered", from = %self.stage, stage = %next);
        self.stage = next;
    }

    /// Discover models and extract their relationships.
    ///
    /// Returns `None` when no model was found; the run is then already done.
    pub fn collect(&mut self) -> Result<Option<Collected>, CliError> {
        self.enter(Stage::Discovering);
        let discovery = match Discoverer::new(&self.settings.model_root)
            .restrict_to(self.settings.dir.clone())
            .discover()
        {
            Ok(discovery) => discovery,
            Err(err) => {
                self.enter(Stage::Aborted);
                return Err(err.into());
            }
        };

        let mut collected = Collected {
            models: discovery.models.len(),
            records: Vec::new(),
            diagnostics: discovery.diagnostics,
        };
        if discovery.models.is_empty() {
            self.console.warn("No models found")?;
            self.enter(Stage::Done);
            return Ok(None);
        }

        self.enter(Stage::Extracting);
        let total = discovery.models.len();
        for (position, model) in discovery.models.iter().enumerate() {
            self.console.progress(position + 1, total, &model.name)?;
            let extraction = extract(model);
            collected.records.extend(extraction.records);
            collected.diagnostics.extend(extraction.diagnostics);
        }
        self.console.progress_finish()?;

        tracing::info!(
            event = "relationships_extracted",
            models = collected.models,
            records = collected.records.len(),
            diagnostics = collected.diagnostics.len()
        );
        Ok(Some(collected))
    }

    /// Run every configured check mode and print the reports.
    pub async fn check(
        &mut self,
        inspector: &dyn SchemaInspector,
        collected: Collected,
    ) -> Result<Vec<AuditReport>, CliError> {
        self.enter(Stage::Checking);
        let mut reports = Vec::with_capacity(self.settings.checks.len());
        for kind in self.settings.checks.clone() {
            let report = audit(
                inspector,
                collected.records.clone(),
                kind,
                &self.settings.suppression,
                self.settings.verbosity,
            )
            .await;
            tracing::info!(
                event = "check_finished",
                check = %kind,
                pass = report.summary.pass,
                warn = report.summary.warn,
                fail = report.summary.fail
            );
            reports.push(report);
        }

        self.enter(Stage::Reporting);
        let show_others = self.settings.verbosity.show_others;
        if show_others {
            for diagnostic in &collected.diagnostics {
                self.console.diagnostic(diagnostic)?;
            }
        }
        for report in &reports {
            self.console.report(report)?;
            if show_others {
                for diagnostic in &report.diagnostics {
                    self.console.diagnostic(diagnostic)?;
                }
            }
        }

        self.enter(Stage::Done);
        Ok(reports)
    }
}
