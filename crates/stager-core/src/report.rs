//! Per-target results and fleet report rendering.
//!
//! Rendering is a pure formatting step over data that has already been
//! validated; it cannot fail (JSON encoding aside) and has no side effects
//! beyond producing text.

use anyhow::Result;
use serde::Serialize;

use crate::catalog::BundleKind;

/// Outcome of one bundle on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleOutcome {
    /// A new download task was created.
    Submitted,
    /// An equivalent task already existed on the target.
    SkippedExisting,
    /// The target already runs the requested version and no force override
    /// was set. Not an error.
    SkippedVersionCurrent,
    /// Terminal for this bundle only.
    Failed(String),
}

impl BundleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn cell(&self) -> String {
        match self {
            Self::Submitted => "submitted".to_string(),
            Self::SkippedExisting => "already queued".to_string(),
            Self::SkippedVersionCurrent => "version current".to_string(),
            Self::Failed(reason) => format!("failed: {reason}"),
        }
    }
}

/// One bundle row of a target's result.
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub kind: BundleKind,
    /// Resolved filename; absent when resolution itself failed.
    pub filename: Option<String>,
    pub outcome: BundleOutcome,
}

/// Everything that happened to one target, in bundle priority order.
#[derive(Debug, Clone, Serialize)]
pub struct TargetResult {
    pub target: String,
    pub bundles: Vec<BundleReport>,
    /// Target-level failure (connection refused, auth rejected). When set,
    /// no bundle was attempted.
    pub error: Option<String>,
}

impl TargetResult {
    pub fn connect_failed(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            bundles: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Overall success: connected, and no bundle submission failed.
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && !self.bundles.iter().any(|b| b.outcome.is_failure())
    }
}

/// Ordered results for a whole run; row order equals input order.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub results: Vec<TargetResult>,
}

impl FleetReport {
    pub fn failed_targets(&self) -> usize {
        self.results.iter().filter(|r| !r.succeeded()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_targets() > 0
    }

    /// Render the report as a human-readable table plus a summary line.
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{:<24} {:<10} {:<44} Outcome\n",
            "Target", "Bundle", "Filename"
        ));
        out.push_str(&format!("{}\n", "-".repeat(96)));

        for result in &self.results {
            if let Some(ref error) = result.error {
                out.push_str(&format!(
                    "{:<24} {:<10} {:<44} failed: {}\n",
                    truncate(&result.target, 24),
                    "-",
                    "-",
                    error
                ));
                continue;
            }
            for bundle in &result.bundles {
                let filename = bundle.filename.as_deref().unwrap_or("-");
                out.push_str(&format!(
                    "{:<24} {:<10} {:<44} {}\n",
                    truncate(&result.target, 24),
                    bundle.kind.label(),
                    truncate(filename, 44),
                    bundle.outcome.cell()
                ));
            }
        }

        let total = self.results.len();
        let failed = self.failed_targets();
        if failed > 0 {
            out.push_str(&format!(
                "\nSummary: {} targets, {} ok, {} failed\n",
                total,
                total - failed,
                failed
            ));
        } else {
            out.push_str(&format!("\nSummary: {total} targets, all OK\n"));
        }

        out
    }

    /// Render the report as machine-readable JSON.
    pub fn render_json(&self) -> Result<String> {
        let output = serde_json::json!({
            "schema_version": 1,
            "results": self.results,
            "summary": {
                "targets": self.results.len(),
                "failed": self.failed_targets(),
            },
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
