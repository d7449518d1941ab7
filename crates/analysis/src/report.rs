use crate::Finding;
use query_analyzer_types::{Origin, Severity};

/// How a reported finding changes between the two schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiffCategory {
    /// Deprecated in the current version
    DeprecatedNow,
    /// Valid in the current version, deprecated in the target
    BecomesDeprecated,
    /// Exists in the current version, gone in the target
    BreaksOnUpgrade,
    /// Already invalid against the current version
    AlreadyBroken,
}

impl DiffCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeprecatedNow => "deprecated_now",
            Self::BecomesDeprecated => "becomes_deprecated",
            Self::BreaksOnUpgrade => "breaks_on_upgrade",
            Self::AlreadyBroken => "already_broken",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DeprecatedNow => "Deprecated Now",
            Self::BecomesDeprecated => "Becomes Deprecated",
            Self::BreaksOnUpgrade => "Breaks on Upgrade",
            Self::AlreadyBroken => "Already Broken",
        }
    }
}

/// A merged finding with its version category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFinding {
    pub finding: Finding,
    pub category: DiffCategory,
}

impl std::ops::Deref for DiffFinding {
    type Target = Finding;

    fn deref(&self) -> &Finding {
        &self.finding
    }
}

/// The current and target version labels of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Versions {
    pub current: String,
    pub target: String,
}

impl Versions {
    #[must_use]
    pub fn new(current: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            target: target.into(),
        }
    }
}

/// Result of analyzing one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    /// Variable name, heredoc label, file stem or `file:line`
    pub identifier: String,
    /// Host position of the start of the query
    pub origin: Origin,
    /// Reportable findings, sorted by position
    pub findings: Vec<DiffFinding>,
    /// Worst severity among `findings`
    pub severity: Severity,
}

impl QueryReport {
    #[must_use]
    pub fn new(identifier: String, origin: Origin, findings: Vec<DiffFinding>) -> Self {
        let severity = findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or_default();
        Self {
            identifier,
            origin,
            findings,
            severity,
        }
    }
}

/// Query counts by worst severity, plus finding counts by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_queries: usize,
    pub valid: usize,
    pub deprecated: usize,
    pub breaking: usize,
    pub deprecated_now: usize,
    pub becomes_deprecated: usize,
    pub breaks_on_upgrade: usize,
    pub already_broken: usize,
}

impl Summary {
    fn add(&mut self, query: &QueryReport) {
        self.total_queries += 1;
        match query.severity {
            Severity::Valid => self.valid += 1,
            Severity::Deprecated => self.deprecated += 1,
            Severity::Breaking => self.breaking += 1,
        }
        for finding in &query.findings {
            match finding.category {
                DiffCategory::DeprecatedNow => self.deprecated_now += 1,
                DiffCategory::BecomesDeprecated => self.becomes_deprecated += 1,
                DiffCategory::BreaksOnUpgrade => self.breaks_on_upgrade += 1,
                DiffCategory::AlreadyBroken => self.already_broken += 1,
            }
        }
    }

    #[must_use]
    pub const fn has_breaking(&self) -> bool {
        self.breaking > 0
    }

    #[must_use]
    pub const fn has_deprecations(&self) -> bool {
        self.deprecated > 0
    }
}

/// Result of analyzing a batch of queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    pub versions: Versions,
    /// In input order
    pub queries: Vec<QueryReport>,
    pub summary: Summary,
}

impl Report {
    #[must_use]
    pub fn new(versions: Versions, queries: Vec<QueryReport>) -> Self {
        let mut summary = Summary::default();
        for query in &queries {
            summary.add(query);
        }
        Self {
            versions,
            queries,
            summary,
        }
    }

    /// All reportable findings, in query order.
    pub fn findings(&self) -> impl Iterator<Item = &DiffFinding> {
        self.queries.iter().flat_map(|q| q.findings.iter())
    }

    /// 0 when clean, 1 when anything breaks, 2 when there are only deprecations.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.summary.has_breaking() {
            1
        } else if self.summary.has_deprecations() {
            2
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FindingKind;

    fn finding(severity: Severity, category: DiffCategory) -> DiffFinding {
        DiffFinding {
            finding: Finding {
                origin: Origin::new("a.graphql", 1, 1),
                target: "Order.name".to_string(),
                severity,
                reason: String::new(),
                kind: FindingKind::Field,
            },
            category,
        }
    }

    fn query(findings: Vec<DiffFinding>) -> QueryReport {
        QueryReport::new("Q".to_string(), Origin::new("a.graphql", 1, 1), findings)
    }

    #[test]
    fn test_query_severity_is_worst_finding() {
        assert_eq!(query(vec![]).severity, Severity::Valid);
        let q = query(vec![
            finding(Severity::Deprecated, DiffCategory::DeprecatedNow),
            finding(Severity::Breaking, DiffCategory::BreaksOnUpgrade),
        ]);
        assert_eq!(q.severity, Severity::Breaking);
    }

    #[test]
    fn test_summary_counts_queries() {
        let report = Report::new(
            Versions::new("2024-10", "2025-01"),
            vec![
                query(vec![]),
                query(vec![
                    finding(Severity::Deprecated, DiffCategory::DeprecatedNow),
                    finding(Severity::Deprecated, DiffCategory::BecomesDeprecated),
                ]),
                query(vec![
                    finding(Severity::Deprecated, DiffCategory::DeprecatedNow),
                    finding(Severity::Breaking, DiffCategory::AlreadyBroken),
                ]),
            ],
        );
        let summary = report.summary;
        assert_eq!(summary.total_queries, 3);
        assert_eq!((summary.valid, summary.deprecated, summary.breaking), (1, 1, 1));
        assert_eq!(summary.deprecated_now, 2);
        assert_eq!(summary.becomes_deprecated, 1);
        assert_eq!(summary.already_broken, 1);
        assert_eq!(report.findings().count(), 4);
    }

    #[test]
    fn test_exit_code() {
        let versions = Versions::new("a", "b");
        assert_eq!(Report::new(versions.clone(), vec![query(vec![])]).exit_code(), 0);
        assert_eq!(
            Report::new(
                versions.clone(),
                vec![query(vec![finding(Severity::Deprecated, DiffCategory::DeprecatedNow)])]
            )
            .exit_code(),
            2
        );
        assert_eq!(
            Report::new(
                versions,
                vec![
                    query(vec![finding(Severity::Deprecated, DiffCategory::DeprecatedNow)]),
                    query(vec![finding(Severity::Breaking, DiffCategory::BreaksOnUpgrade)]),
                ]
            )
            .exit_code(),
            1
        );
    }
}
