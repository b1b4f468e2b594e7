use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::check::CheckKind;
use crate::diagnostic::Diagnostic;
use crate::record::RelationshipRecord;
use crate::suppression::SuppressionList;

const SUPPRESSED_HINT: &str = "; it may belong to a dependency, verify if needed";

/// Severity of a classified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEntry {
    pub status: Status,
    pub subject: String,
    pub message: String,
    pub record: RelationshipRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

/// Classified outcome of one check pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuditReport {
    pub check: CheckKind,
    /// Whether PASS entries are part of the visible output.
    pub show_all: bool,
    pub entries: Vec<ReportEntry>,
    pub suppressions: SuppressionList,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: ReportSummary,
}

/// Classify a checked record. Suppression only downgrades FAIL to WARN; the
/// stored check result is left untouched.
pub fn classify(
    record: &RelationshipRecord,
    kind: CheckKind,
    suppression: &SuppressionList,
) -> Status {
    if kind.result(record) {
        Status::Pass
    } else if kind
        .suppression_keys(record)
        .iter()
        .any(|key| suppression.contains(key))
    {
        Status::Warn
    } else {
        Status::Fail
    }
}

impl AuditReport {
    /// Build a report from records that are already checked, deduplicated
    /// and sorted.
    pub fn from_records(
        kind: CheckKind,
        records: Vec<RelationshipRecord>,
        suppression: &SuppressionList,
        diagnostics: Vec<Diagnostic>,
        show_all: bool,
    ) -> Self {
        let mut summary = ReportSummary::default();
        let entries = records
            .into_iter()
            .map(|record| {
                let status = classify(&record, kind, suppression);
                let mut message = kind.message(&record, status == Status::Pass);
                match status {
                    Status::Pass => summary.pass += 1,
                    Status::Warn => {
                        summary.warn += 1;
                        message.push_str(SUPPRESSED_HINT);
                    }
                    Status::Fail => summary.fail += 1,
                }
                ReportEntry {
                    status,
                    subject: kind.subject(&record),
                    message,
                    record,
                }
            })
            .collect();

        Self {
            check: kind,
            show_all,
            entries,
            suppressions: suppression.clone(),
            diagnostics,
            summary,
        }
    }

    /// Entries to print: FAIL and WARN always, PASS only with `show_all`.
    pub fn visible_entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(move |entry| self.show_all || entry.status != Status::Pass)
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.visible_entries()
            .map(|entry| format!("{}  {}", entry.status.label(), entry.message))
            .collect()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} check: {} pass, {} warn, {} fail",
            self.check, self.summary.pass, self.summary.warn, self.summary.fail
        )
    }

    /// True when any unsuppressed FAIL is present.
    pub fn has_failures(&self) -> bool {
        self.summary.fail > 0
    }
}
