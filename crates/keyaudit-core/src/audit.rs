use std::collections::HashMap;

use crate::check::CheckKind;
use crate::diagnostic::Diagnostic;
use crate::inspector::SchemaInspector;
use crate::record::RelationshipRecord;
use crate::report::AuditReport;
use crate::suppression::SuppressionList;

/// Output switches for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    /// Emit PASS lines in addition to FAIL/WARN.
    pub show_all: bool,
    /// Emit discovery, extraction and schema query diagnostics.
    pub show_others: bool,
}

/// Check, sort and classify relationship records for one check kind.
///
/// Records are deduplicated on the mode key before any query runs, so each
/// schema fact is asked once. A failed query counts as "absent" and is
/// recorded as a diagnostic.
pub async fn audit(
    inspector: &dyn SchemaInspector,
    records: Vec<RelationshipRecord>,
    kind: CheckKind,
    suppression: &SuppressionList,
    verbosity: Verbosity,
) -> AuditReport {
    let records = dedup_records(records, kind);
    let mut diagnostics = Vec::new();
    let mut checked = Vec::with_capacity(records.len());

    for mut record in records {
        let outcome = match kind {
            CheckKind::Constraint => {
                inspector
                    .constraint_exists(&record.parent, &record.foreign)
                    .await
            }
            CheckKind::Index => inspector.is_indexed(&record.foreign).await,
        };

        let present = match outcome {
            Ok(present) => present,
            Err(err) => {
                let subject = kind.subject(&record);
                tracing::debug!(
                    event = "schema_query_failed",
                    engine = inspector.engine(),
                    check = %kind,
                    subject = %subject,
                    error = %err
                );
                diagnostics.push(Diagnostic::SchemaQuery {
                    subject,
                    reason: err.to_string(),
                });
                false
            }
        };

        kind.set_result(&mut record, present);
        checked.push(record);
    }

    sort_records(&mut checked, kind);
    tracing::debug!(event = "records_checked", check = %kind, records = checked.len());

    AuditReport::from_records(kind, checked, suppression, diagnostics, verbosity.show_all)
}

/// Keep the first record captured for each mode key. In index mode the
/// members of dropped duplicates are remembered in `shared_with`.
pub fn dedup_records(records: Vec<RelationshipRecord>, kind: CheckKind) -> Vec<RelationshipRecord> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<RelationshipRecord> = Vec::with_capacity(records.len());

    for record in records {
        let (left, right) = kind.key(&record);
        let key = (left.to_string(), right.to_string());
        match positions.get(&key) {
            Some(&position) => {
                let first = &mut kept[position];
                if kind == CheckKind::Index && !first.members().any(|m| m == record.member) {
                    first.shared_with.push(record.member);
                }
            }
            None => {
                positions.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Stable sort on the mode key; equal keys keep capture order.
pub fn sort_records(records: &mut [RelationshipRecord], kind: CheckKind) {
    records.sort_by(|left, right| kind.key(left).cmp(&kind.key(right)));
}
