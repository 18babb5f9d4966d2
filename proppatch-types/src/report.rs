use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report artifact produced by a patch run (dry-run or write).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchReport {
    /// Schema identifier, e.g. "proppatch.report.v1".
    pub schema: String,

    pub tool: ToolInfo,

    #[serde(default)]
    pub run: RunInfo,

    /// Path of the patched file, as given on the command line.
    pub target: String,

    /// Prop name injected by the rule set.
    pub prop: String,

    /// True when the run did not write anything to disk.
    pub dry_run: bool,

    #[serde(default)]
    pub outcomes: Vec<RuleOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileChange>,

    pub summary: PatchSummary,
}

impl PatchReport {
    pub fn new(tool: ToolInfo, target: String, prop: String, dry_run: bool) -> Self {
        Self {
            schema: crate::schema::PROPPATCH_REPORT_V1.to_string(),
            tool,
            run: RunInfo {
                started_at: Some(Utc::now()),
                ended_at: None,
            },
            target,
            prop,
            dry_run,
            outcomes: vec![],
            file: None,
            summary: PatchSummary::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Per-rule result: how often the rule's pattern matched the buffer.
///
/// A zero count is not an error by itself; callers decide whether to warn
/// or fail on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub title: String,
    pub matches: u64,
}

/// Before/after identity of the patched file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub sha256_before: String,
    pub sha256_after: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_before: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_after: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchSummary {
    pub rules_total: u64,
    pub rules_matched: u64,
    pub rules_unmatched: u64,
    pub replacements: u64,

    /// True when the output buffer differs from the input buffer.
    pub changed: bool,
}
