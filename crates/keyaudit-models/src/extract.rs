use std::collections::HashSet;

use keyaudit_core::{
    Diagnostic, QualifiedColumn, RelationKind, Relationship, RelationshipRecord,
};

use crate::discover::ModelDescriptor;
use crate::manifest::RelationDecl;

/// Member name reserved for the extractor's own entry point.
pub const ENTRY_POINT: &str = "relationships";

/// Records and diagnostics extracted from one model.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<RelationshipRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turn a model's declared members into relationship records, in
/// declaration order. Members that do not yield a complete relationship are
/// skipped with a diagnostic.
pub fn extract(model: &ModelDescriptor) -> Extraction {
    let mut extraction = Extraction::default();
    let mut seen = HashSet::new();

    for decl in &model.relations {
        let member = decl.member.trim();
        let outcome = if member.is_empty() {
            Err("member has no name".to_string())
        } else if !seen.insert(member.to_string()) {
            Err("member is declared more than once".to_string())
        } else {
            relationship_from(model, member, decl)
        };

        match outcome {
            Ok(relationship) => extraction
                .records
                .push(RelationshipRecord::new(&model.name, relationship)),
            Err(reason) => {
                tracing::debug!(
                    event = "member_skipped",
                    model = %model.name,
                    member = %member,
                    reason = %reason
                );
                extraction.diagnostics.push(Diagnostic::Extraction {
                    model: model.name.clone(),
                    member: member.to_string(),
                    reason,
                });
            }
        }
    }

    extraction
}

fn relationship_from(
    model: &ModelDescriptor,
    member: &str,
    decl: &RelationDecl,
) -> Result<Relationship, String> {
    if member == ENTRY_POINT {
        return Err(format!("`{ENTRY_POINT}` is reserved"));
    }
    if let Some(owner) = decl.declared_on.as_deref()
        && owner != model.name
        && owner != model.short_name()
    {
        return Err(format!("inherited from {owner}"));
    }

    let kind = RelationKind::from_name(&decl.kind)
        .ok_or_else(|| format!("`{}` is not a relationship kind", decl.kind))?;
    let parent = parse_key("parent", decl.parent.as_deref())?;
    let foreign = parse_key("foreign", decl.foreign.as_deref())?;

    Ok(Relationship::new(member, kind, parent, foreign))
}

fn parse_key(side: &str, raw: Option<&str>) -> Result<QualifiedColumn, String> {
    let raw = raw.ok_or_else(|| format!("{side} key is missing"))?;
    let column: QualifiedColumn = raw
        .parse()
        .map_err(|err| format!("{side} key: {err}"))?;
    if !column.is_complete() {
        return Err(format!("{side} key `{raw}` has an empty table or column"));
    }
    Ok(column)
}
