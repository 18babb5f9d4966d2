//! Apply engine for proppatch rule pipelines.
//!
//! Responsibilities:
//! - Run a [`RuleSet`] over a file's contents as a single in-memory buffer.
//! - Record per-rule match counts and before/after file identity (sha256).
//! - Generate a unified diff preview.
//! - Write the result back (optionally after a backup), dry-run aware.
//!
//! The transformed buffer is fully assembled before the target is opened for
//! write, so a failed write can never leave a half-transformed file behind.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use diffy::PatchFormatter;
use fs_err as fs;
use proppatch_rules::RuleSet;
use proppatch_types::report::{FileChange, PatchReport, RuleOutcome, ToolInfo};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

mod error;

pub use error::{ExpectationError, PatchError, PatchResult};

#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// When true, no file is written; the report and diff are still produced.
    pub dry_run: bool,
    /// Fail (exit code 2) when any injection rule matches zero times.
    pub require_matches: bool,
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            require_matches: false,
            backup_enabled: true,
            backup_suffix: ".proppatch.bak".to_string(),
        }
    }
}

/// Outcome of running the rule pipeline over one buffer.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The transformed buffer.
    pub buffer: String,
    /// Per-rule match counts for the injection rules, in application order.
    pub outcomes: Vec<RuleOutcome>,
    /// Match count of the trailing cleanup pass.
    pub cleanup_matches: u64,
}

impl PipelineOutcome {
    /// Ids of injection rules that matched zero times.
    pub fn unmatched_rules(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.matches == 0)
            .map(|o| o.rule_id.clone())
            .collect()
    }
}

/// Run the injection rules in catalog order, then the cleanup pass.
///
/// Pure buffer-to-buffer transformation; no I/O. Every rule runs regardless
/// of whether earlier rules matched.
pub fn run_rules(rules: &RuleSet, input: &str) -> PipelineOutcome {
    let mut buffer = input.to_string();
    let mut outcomes = Vec::with_capacity(rules.rules().len());

    for rule in rules.rules() {
        let (next, matches) = rule.apply(&buffer);
        debug!(rule = rule.id(), matches, "rule applied");
        buffer = next;
        outcomes.push(RuleOutcome {
            rule_id: rule.id().to_string(),
            title: rule.title().to_string(),
            matches,
        });
    }

    let (next, cleanup_matches) = rules.cleanup().apply(&buffer);
    debug!(
        rule = rules.cleanup().id(),
        matches = cleanup_matches,
        "cleanup applied"
    );
    buffer = next;

    PipelineOutcome {
        buffer,
        outcomes,
        cleanup_matches,
    }
}

/// Patch one file with the given rule set.
///
/// Returns the report artifact and a git-style unified diff of the change
/// (empty when the pipeline was a no-op). With `opts.dry_run` the target is
/// never written; with `opts.require_matches`, unmatched injection rules
/// abort the run before anything touches disk.
pub fn patch_file(
    path: &Utf8Path,
    rules: &RuleSet,
    tool: ToolInfo,
    opts: &PatchOptions,
) -> PatchResult<(PatchReport, String)> {
    let before = fs::read_to_string(path)
        .with_context(|| format!("read {}", path))
        .map_err(PatchError::Runtime)?;

    let outcome = run_rules(rules, &before);
    let changed = outcome.buffer != before;

    let unmatched = outcome.unmatched_rules();
    for rule_id in &unmatched {
        warn!(rule = rule_id.as_str(), "rule matched zero times");
    }
    if opts.require_matches && !unmatched.is_empty() {
        return Err(ExpectationError::UnmatchedRules { rules: unmatched }.into());
    }

    let patch = render_patch(path, &before, &outcome.buffer);

    let mut report = PatchReport::new(
        tool,
        path.to_string(),
        rules.prop().to_string(),
        opts.dry_run,
    );
    report.summary.rules_total = outcome.outcomes.len() as u64;
    report.summary.rules_matched =
        outcome.outcomes.iter().filter(|o| o.matches > 0).count() as u64;
    report.summary.rules_unmatched = report.summary.rules_total - report.summary.rules_matched;
    report.summary.replacements = outcome.outcomes.iter().map(|o| o.matches).sum();
    report.summary.changed = changed;
    report.outcomes = outcome.outcomes;
    report.outcomes.push(RuleOutcome {
        rule_id: rules.cleanup().id().to_string(),
        title: rules.cleanup().title().to_string(),
        matches: outcome.cleanup_matches,
    });

    let mut file = FileChange {
        path: path.to_string(),
        sha256_before: sha256_hex(before.as_bytes()),
        sha256_after: sha256_hex(outcome.buffer.as_bytes()),
        bytes_before: Some(before.len() as u64),
        bytes_after: Some(outcome.buffer.len() as u64),
        backup_path: None,
        written_at: None,
    };

    if !opts.dry_run && changed {
        if opts.backup_enabled {
            let backup = Utf8PathBuf::from(format!("{}{}", path, opts.backup_suffix));
            fs::write(&backup, &before)
                .with_context(|| format!("write backup {}", backup))
                .map_err(PatchError::Runtime)?;
            file.backup_path = Some(backup.to_string());
        }
        fs::write(path, &outcome.buffer)
            .with_context(|| format!("write {}", path))
            .map_err(PatchError::Runtime)?;
        file.written_at = Some(Utc::now());
        info!(target_file = %path, replacements = report.summary.replacements, "wrote patched file");
    } else if !opts.dry_run {
        info!(target_file = %path, "no changes to write");
    }

    report.file = Some(file);
    report.run.ended_at = Some(Utc::now());

    Ok((report, patch))
}

/// Render a git-style patch for a single file, empty when nothing changed.
pub fn render_patch(path: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    out.push_str(&PatchFormatter::new().fmt_patch(&patch).to_string());
    if !out.ends_with('\n') {
        out.push('\n');
    }

    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
