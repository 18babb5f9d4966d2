//! Serde shape tests for the report artifact.

use pretty_assertions::assert_eq;
use proppatch_types::report::{
    FileChange, PatchReport, PatchSummary, RuleOutcome, ToolInfo,
};
use proppatch_types::schema;

fn sample_report() -> PatchReport {
    let mut report = PatchReport::new(
        ToolInfo {
            name: "proppatch".to_string(),
            version: Some("0.0.0".to_string()),
        },
        "src/components/ProjectForm.jsx".to_string(),
        "darkMode".to_string(),
        true,
    );
    report.outcomes.push(RuleOutcome {
        rule_id: "card.with_class".to_string(),
        title: "Inject prop into <Card className=...>".to_string(),
        matches: 7,
    });
    report.summary = PatchSummary {
        rules_total: 9,
        rules_matched: 1,
        rules_unmatched: 8,
        replacements: 7,
        changed: true,
    };
    report
}

#[test]
fn report_uses_v1_schema_tag() {
    let report = sample_report();
    assert_eq!(report.schema, schema::PROPPATCH_REPORT_V1);
    assert_eq!(report.schema, "proppatch.report.v1");
}

#[test]
fn report_roundtrips_through_json() {
    let report = sample_report();
    let json = serde_json::to_string_pretty(&report).expect("serialize");
    let back: PatchReport = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back.schema, report.schema);
    assert_eq!(back.target, report.target);
    assert_eq!(back.prop, report.prop);
    assert!(back.dry_run);
    assert_eq!(back.outcomes.len(), 1);
    assert_eq!(back.outcomes[0].rule_id, "card.with_class");
    assert_eq!(back.outcomes[0].matches, 7);
    assert_eq!(back.summary.replacements, 7);
    assert!(back.summary.changed);
}

#[test]
fn absent_optional_fields_are_omitted() {
    let report = sample_report();
    let json = serde_json::to_string(&report).expect("serialize");

    // No file change recorded on a dry run, so the key must not appear.
    assert!(!json.contains("\"file\""));
    assert!(!json.contains("\"ended_at\""));
}

#[test]
fn file_change_roundtrips_with_backup() {
    let change = FileChange {
        path: "form.jsx".to_string(),
        sha256_before: "aa".repeat(32),
        sha256_after: "bb".repeat(32),
        bytes_before: Some(120),
        bytes_after: Some(150),
        backup_path: Some("form.jsx.proppatch.bak".to_string()),
        written_at: None,
    };

    let json = serde_json::to_string(&change).expect("serialize");
    let back: FileChange = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.path, "form.jsx");
    assert_eq!(back.backup_path.as_deref(), Some("form.jsx.proppatch.bak"));
    assert_eq!(back.bytes_after, Some(150));
}

#[test]
fn report_tolerates_missing_optional_sections() {
    let json = r#"{
        "schema": "proppatch.report.v1",
        "tool": { "name": "proppatch" },
        "target": "a.jsx",
        "prop": "darkMode",
        "dry_run": false,
        "summary": {
            "rules_total": 0,
            "rules_matched": 0,
            "rules_unmatched": 0,
            "replacements": 0,
            "changed": false
        }
    }"#;

    let report: PatchReport = serde_json::from_str(json).expect("deserialize");
    assert!(report.outcomes.is_empty());
    assert!(report.file.is_none());
    assert!(report.run.started_at.is_none());
}
