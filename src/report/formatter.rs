use crate::outcome::{ValidationOutcome, Verdict};
use crate::rules::RuleReport;
use serde::Serialize;

/// Totals over a set of rule reports.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rules: usize,
    pub checked: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn of(reports: &[RuleReport]) -> Self {
        reports.iter().fold(Self::default(), |summary, report| Self {
            rules: summary.rules + 1,
            checked: summary.checked + report.outcomes.len(),
            failed: summary.failed + report.failures().count(),
            interrupted: summary.interrupted || report.interrupted,
        })
    }

    pub fn passed(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: RunSummary,
    reports: &'a [RuleReport],
}

/// Renders rule reports for people (text) or for other tools (JSON).
pub struct ReportFormatter;

impl ReportFormatter {
    /// One block per rule: a header line, then every failing outcome with its reason.
    /// Passing outcomes are only counted.
    pub fn format_text(reports: &[RuleReport]) -> String {
        let mut out = String::new();
        for report in reports {
            let failed = report.failures().count();
            let status = if failed == 0 { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "[{}] {} ({}): {} checked, {} failed{}\n",
                status,
                report.rule,
                report.subject,
                report.outcomes.len(),
                failed,
                if report.interrupted { ", interrupted" } else { "" }
            ));
            if report.outcomes.is_empty() && !report.interrupted {
                out.push_str("  nothing to check\n");
            }
            for outcome in report.failures() {
                out.push_str(&format!("  - {}\n", Self::format_outcome(outcome)));
            }
        }

        let summary = RunSummary::of(reports);
        out.push_str(&format!(
            "\n{} rules, {} checked, {} failed",
            summary.rules, summary.checked, summary.failed
        ));
        if summary.interrupted {
            out.push_str(" (interrupted, results are partial)");
        }
        out.push('\n');
        out
    }

    pub fn format_outcome(outcome: &ValidationOutcome) -> String {
        match &outcome.verdict {
            Verdict::Pass => format!("{}: ok", outcome.subject),
            Verdict::Fail(failure) => {
                format!("{}: {} ({})", outcome.subject, failure.reason, failure.kind)
            }
        }
    }

    pub fn format_json(reports: &[RuleReport]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonReport {
            summary: RunSummary::of(reports),
            reports,
        })
    }
}
