use crate::report::{DiffCategory, DiffFinding, QueryReport, Versions};
use crate::{resolve, Finding, FindingKind, ResolveError};
use query_analyzer_schema::SchemaModel;
use query_analyzer_syntax::{parse, QueryDocument, QuerySource};
use query_analyzer_types::{Origin, Severity};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolve `document` against both schemas and merge the results.
///
/// One finding is kept per target identifier, the worst one of each run.
/// Nothing is reported for references valid in both versions.
pub fn diff(
    document: &QueryDocument,
    current: &SchemaModel,
    target: &SchemaModel,
    versions: &Versions,
) -> Result<Vec<DiffFinding>, ResolveError> {
    let current_findings = resolve(document, current)?;
    let target_findings = resolve(document, target)?;

    let current_index = FindingIndex::new(&current_findings);
    let target_index = FindingIndex::new(&target_findings);

    let mut merged = Vec::new();
    for (id, found) in current_index.iter() {
        if let Some(diffed) = merge(found, target_index.get(id), versions) {
            merged.push(diffed);
        }
    }

    // Only reachable in the target, typically below a field that is missing
    // from the current version and already reported there.
    for (id, found) in target_index.iter() {
        if current_index.get(id).is_some() {
            continue;
        }
        let category = match found.severity {
            Severity::Valid => continue,
            Severity::Deprecated => DiffCategory::BecomesDeprecated,
            Severity::Breaking => DiffCategory::BreaksOnUpgrade,
        };
        merged.push(upgraded(found, category, versions));
    }

    merged.sort_by(|a, b| a.origin.cmp(&b.origin));
    Ok(merged)
}

fn merge(current: &Finding, target: Option<&Finding>, versions: &Versions) -> Option<DiffFinding> {
    if current.severity == Severity::Breaking {
        return Some(DiffFinding {
            finding: current.clone(),
            category: DiffCategory::AlreadyBroken,
        });
    }

    let target_severity = target.map(|t| t.severity);
    if target_severity == Some(Severity::Breaking) {
        return Some(upgraded(current, DiffCategory::BreaksOnUpgrade, versions));
    }

    if current.severity == Severity::Deprecated {
        return Some(DiffFinding {
            finding: current.clone(),
            category: DiffCategory::DeprecatedNow,
        });
    }

    match target {
        Some(target) if target.severity == Severity::Deprecated => Some(DiffFinding {
            finding: Finding {
                origin: current.origin.clone(),
                reason: format!("deprecated in {}: {}", versions.target, target.reason),
                ..target.clone()
            },
            category: DiffCategory::BecomesDeprecated,
        }),
        _ => None,
    }
}

/// A finding that only shows up against the target version.
fn upgraded(found: &Finding, category: DiffCategory, versions: &Versions) -> DiffFinding {
    let (severity, reason) = match category {
        DiffCategory::BecomesDeprecated => (
            Severity::Deprecated,
            format!("deprecated in {}: {}", versions.target, found.reason),
        ),
        _ => (
            Severity::Breaking,
            format!("breaks on upgrade to {}", versions.target),
        ),
    };
    DiffFinding {
        finding: Finding {
            severity,
            reason,
            ..found.clone()
        },
        category,
    }
}

/// Worst finding per target identifier, in order of first appearance.
struct FindingIndex<'a> {
    order: Vec<&'a str>,
    worst: HashMap<&'a str, &'a Finding>,
}

impl<'a> FindingIndex<'a> {
    fn new(findings: &'a [Finding]) -> Self {
        let mut order = Vec::new();
        let mut worst: HashMap<&str, &Finding> = HashMap::new();
        for finding in findings {
            let id = finding.target.as_str();
            match worst.get(id) {
                Some(existing) if existing.severity >= finding.severity => {}
                Some(_) => {
                    worst.insert(id, finding);
                }
                None => {
                    order.push(id);
                    worst.insert(id, finding);
                }
            }
        }
        Self { order, worst }
    }

    fn get(&self, id: &str) -> Option<&'a Finding> {
        self.worst.get(id).copied()
    }

    fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Finding)> + '_ {
        self.order.iter().map(|id| (*id, self.worst[id]))
    }
}

/// Analyzes queries against a fixed pair of schema versions.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    current: &'a SchemaModel,
    target: &'a SchemaModel,
    versions: &'a Versions,
}

impl<'a> Analyzer<'a> {
    #[must_use]
    pub const fn new(
        current: &'a SchemaModel,
        target: &'a SchemaModel,
        versions: &'a Versions,
    ) -> Self {
        Self {
            current,
            target,
            versions,
        }
    }

    pub fn diff(&self, document: &QueryDocument) -> Result<Vec<DiffFinding>, ResolveError> {
        diff(document, self.current, self.target, self.versions)
    }

    /// Parse and diff one query.
    ///
    /// A query that cannot be parsed or resolved yields a single breaking
    /// finding for the document instead of an error, so one bad query never
    /// stops a batch.
    #[must_use]
    #[tracing::instrument(skip_all, fields(query = %source.display_name()))]
    pub fn analyze(&self, source: &QuerySource) -> QueryReport {
        let identifier = source.display_name();
        let findings = match parse(source) {
            Ok(document) => match self.diff(&document) {
                Ok(findings) => findings,
                Err(err) => {
                    tracing::debug!(error = %err, "Query cannot be resolved");
                    vec![document_finding(source, err.origin().clone(), &err)]
                }
            },
            Err(err) => {
                tracing::debug!(error = %err, "Query cannot be parsed");
                let origin = err.position().map_or_else(
                    || source.origin(),
                    |(line, column)| Origin::new(Arc::clone(&source.file), line, column),
                );
                vec![document_finding(source, origin, &err)]
            }
        };
        QueryReport::new(identifier, source.origin(), findings)
    }
}

fn document_finding(source: &QuerySource, origin: Origin, error: &dyn std::error::Error) -> DiffFinding {
    DiffFinding {
        finding: Finding::breaking(
            FindingKind::Document,
            origin,
            source.display_name(),
            error.to_string(),
        ),
        category: DiffCategory::AlreadyBroken,
    }
}
