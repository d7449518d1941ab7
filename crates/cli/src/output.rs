//! Report rendering: colored terminal output and JSON for CI.

use colored::{ColoredString, Colorize};
use query_analyzer_analysis::{DiffCategory, DiffFinding, Report, Summary};
use query_analyzer_types::Severity;
use std::collections::BTreeMap;
use std::io::{self, Write};

fn icon(category: DiffCategory) -> ColoredString {
    match category {
        DiffCategory::DeprecatedNow | DiffCategory::BecomesDeprecated => {
            format!("⚠ {}", category.label()).yellow()
        }
        DiffCategory::BreaksOnUpgrade | DiffCategory::AlreadyBroken => {
            format!("✗ {}", category.label()).red()
        }
    }
}

pub fn render_human(report: &Report, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Query Analyzer".bold().blue())?;
    writeln!(
        out,
        "{}",
        format!(
            "Comparing {} → {}",
            report.versions.current, report.versions.target
        )
        .dimmed()
    )?;
    writeln!(out)?;

    render_summary(&report.summary, out)?;

    let mut by_file: BTreeMap<&str, Vec<&DiffFinding>> = BTreeMap::new();
    for finding in report.findings() {
        by_file
            .entry(finding.origin.file.as_ref())
            .or_default()
            .push(finding);
    }

    if !by_file.is_empty() {
        writeln!(out, "{}", "Issues:".bold())?;
        writeln!(out)?;
    }
    for (file, mut findings) in by_file {
        findings.sort_by_key(|f| (f.origin.line, f.origin.column));
        writeln!(out, "{}", file.cyan().bold())?;
        for finding in findings {
            let location = format!("  {}:{}", finding.origin.line, finding.origin.column);
            writeln!(
                out,
                "{} {} {}",
                location.dimmed(),
                icon(finding.category),
                finding.target.bold()
            )?;
            match finding.severity {
                Severity::Deprecated => {
                    writeln!(out, "       {}", format!("Reason: {}", finding.reason).dimmed())?;
                }
                _ => writeln!(out, "       {}", finding.reason)?,
            }
        }
        writeln!(out)?;
    }

    render_footer(report, out)
}

fn render_summary(summary: &Summary, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "Summary".bold())?;
    let row = |label: &str, count: usize, mark: ColoredString| {
        format!("  {label:<20} {count:>5}  {mark}")
    };
    let flagged = |count: usize, mark: &str, warn: fn(&str) -> ColoredString| {
        if count > 0 {
            warn(mark)
        } else {
            "-".dimmed()
        }
    };

    writeln!(out, "{}", row("Total Queries", summary.total_queries, "".normal()))?;
    writeln!(out, "{}", row("Still Valid", summary.valid, "✓".green()))?;
    writeln!(
        out,
        "{}",
        row(
            "Deprecated Now",
            summary.deprecated_now,
            flagged(summary.deprecated_now, "⚠", |s| s.yellow())
        )
    )?;
    writeln!(
        out,
        "{}",
        row(
            "Becomes Deprecated",
            summary.becomes_deprecated,
            flagged(summary.becomes_deprecated, "⚠", |s| s.yellow())
        )
    )?;
    writeln!(
        out,
        "{}",
        row(
            "Breaks on Upgrade",
            summary.breaks_on_upgrade,
            flagged(summary.breaks_on_upgrade, "✗", |s| s.red())
        )
    )?;
    writeln!(
        out,
        "{}",
        row(
            "Already Broken",
            summary.already_broken,
            flagged(summary.already_broken, "✗", |s| s.red())
        )
    )?;
    writeln!(out)
}

fn render_footer(report: &Report, out: &mut impl Write) -> io::Result<()> {
    let summary = &report.summary;
    if summary.has_breaking() {
        writeln!(out, "{}", "✗ Breaking changes detected!".red().bold())?;
        writeln!(
            out,
            "{}",
            format!(
                "Fix breaking changes before upgrading to {}",
                report.versions.target
            )
            .dimmed()
        )
    } else if summary.has_deprecations() {
        writeln!(out, "{}", "⚠ Deprecation warnings detected".yellow().bold())?;
        writeln!(
            out,
            "{}",
            "Consider updating deprecated fields before they are removed".dimmed()
        )
    } else {
        writeln!(out, "{}", "✓ All queries are compatible!".green().bold())
    }
}

/// Machine-readable report, findings in query order.
///
/// Keys keep the order written here.
#[must_use]
pub fn to_json(report: &Report) -> serde_json::Value {
    let summary = &report.summary;
    let items: Vec<_> = report
        .queries
        .iter()
        .flat_map(|query| {
            query.findings.iter().map(move |finding| {
                serde_json::json!({
                    "category": finding.category.as_str(),
                    "severity": finding.severity.as_str(),
                    "kind": finding.kind.as_str(),
                    "file": finding.origin.file.as_ref(),
                    "line": finding.origin.line,
                    "column": finding.origin.column,
                    "target": finding.target,
                    "message": finding.reason,
                    "query_identifier": query.identifier,
                })
            })
        })
        .collect();

    serde_json::json!({
        "current_version": report.versions.current,
        "target_version": report.versions.target,
        "summary": {
            "total_queries": summary.total_queries,
            "valid": summary.valid,
            "deprecated": summary.deprecated,
            "breaking": summary.breaking,
            "deprecated_now": summary.deprecated_now,
            "becomes_deprecated": summary.becomes_deprecated,
            "breaks_on_upgrade": summary.breaks_on_upgrade,
            "already_broken": summary.already_broken,
        },
        "items": items,
    })
}

pub fn render_json(report: &Report, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &to_json(report))?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_analyzer_analysis::{BatchAnalyzer, Versions};
    use query_analyzer_extract::ExtractedQuery;
    use query_analyzer_schema::SchemaModel;
    use query_analyzer_test_utils::fixtures::{
        CURRENT_SCHEMA, CURRENT_VERSION, TARGET_SCHEMA, TARGET_VERSION,
    };
    use query_analyzer_test_utils::sdl_to_introspection_string;
    use std::path::Path;
    use std::sync::Arc;

    fn model(sdl: &str) -> Arc<SchemaModel> {
        Arc::new(SchemaModel::from_json_str(&sdl_to_introspection_string(sdl)).unwrap())
    }

    fn report() -> Report {
        let sources = vec![
            ExtractedQuery::new("{ shop { name } }", Path::new("queries/shop.graphql"), 1)
                .with_identifier("shop")
                .into_source(),
            ExtractedQuery::new(
                "query {\n  orders(sortKey: CUSTOMER_NAME) {\n    nodes { billingAddress { city } }\n  }\n}",
                Path::new("app/Orders.php"),
                12,
            )
            .with_identifier("ORDERS_QUERY")
            .into_source(),
        ];
        BatchAnalyzer::new(
            model(CURRENT_SCHEMA),
            model(TARGET_SCHEMA),
            Versions::new(CURRENT_VERSION, TARGET_VERSION),
        )
        .with_workers(1)
        .run(sources)
    }

    #[test]
    fn test_json_report() {
        let json = serde_json::to_string_pretty(&to_json(&report())).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "current_version": "2024-10",
          "target_version": "2025-01",
          "summary": {
            "total_queries": 2,
            "valid": 1,
            "deprecated": 0,
            "breaking": 1,
            "deprecated_now": 1,
            "becomes_deprecated": 0,
            "breaks_on_upgrade": 1,
            "already_broken": 0
          },
          "items": [
            {
              "category": "deprecated_now",
              "severity": "deprecated",
              "kind": "enum_value",
              "file": "app/Orders.php",
              "line": 13,
              "column": 19,
              "target": "OrderSortKeys.CUSTOMER_NAME",
              "message": "Sort by `ID` instead.",
              "query_identifier": "ORDERS_QUERY"
            },
            {
              "category": "breaks_on_upgrade",
              "severity": "breaking",
              "kind": "field",
              "file": "app/Orders.php",
              "line": 14,
              "column": 13,
              "target": "Order.billingAddress",
              "message": "breaks on upgrade to 2025-01",
              "query_identifier": "ORDERS_QUERY"
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_json_keys_keep_written_order() {
        let json = to_json(&report());
        let keys: Vec<_> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["current_version", "target_version", "summary", "items"]);

        let item: Vec<_> = json["items"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(&item[..3], ["category", "severity", "kind"]);
    }

    #[test]
    fn test_human_report_groups_by_file() {
        let mut out = Vec::new();
        render_human(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Comparing 2024-10 → 2025-01"));
        assert!(text.contains("app/Orders.php"));
        assert!(!text.contains("queries/shop.graphql"));
        assert!(text.contains("Deprecated Now"));
        assert!(text.contains("Reason: Sort by `ID` instead."));
        assert!(text.contains("breaks on upgrade to 2025-01"));
        assert!(text.contains("Fix breaking changes before upgrading to 2025-01"));

        let deprecated = text.find("13:19").unwrap();
        let breaking = text.find("14:13").unwrap();
        assert!(deprecated < breaking);
    }
}
