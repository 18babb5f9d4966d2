//! End-to-end engine tests over real files.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use proppatch_edit::{patch_file, run_rules, PatchError, PatchOptions};
use proppatch_rules::{RuleSet, DEFAULT_PROP};
use proppatch_types::report::ToolInfo;
use std::fs;
use tempfile::TempDir;

const FIXTURE: &str = r#"import React, { useState } from 'react';

export default function ProjectForm({ onBack, darkMode = false }) {
    const addProduct = () => {};
    const handleSubmit = async () => {};

    return (
        <div>
            <Card className="md:col-span-2">
                <CardHeader title="Información Básica" />
                <Input label="Nombre Emprendedor" value={data.nombre} onChange={update} />
            </Card>
            <Card>
                <TabButton active={activeTab === 0} onClick={() => setActiveTab(0)}>General</TabButton>
                <DynamicTable
                    columns={columns}
                    data={data.detalle_demanda}
                />
                <DynamicTable columns={columns} data={data.equipos} />
            </Card>
            <Button onClick={addProduct} variant="outline">Agregar Producto</Button>
            <Button onClick={handleSubmit}>Guardar Proyecto</Button>
        </div>
    );
}
"#;

const PATCHED: &str = r#"import React, { useState } from 'react';

export default function ProjectForm({ onBack, darkMode = false }) {
    const addProduct = () => {};
    const handleSubmit = async () => {};

    return (
        <div>
            <Card darkMode={darkMode} className="md:col-span-2">
                <CardHeader darkMode={darkMode} title="Información Básica" />
                <Input darkMode={darkMode} label="Nombre Emprendedor" value={data.nombre} onChange={update} />
            </Card>
            <Card darkMode={darkMode}>
                <TabButton darkMode={darkMode} active={activeTab === 0} onClick={() => setActiveTab(0)}>General</TabButton>
                <DynamicTable darkMode={darkMode}
                    columns={columns}
                    data={data.detalle_demanda}
                />
                <DynamicTable darkMode={darkMode} columns={columns} data={data.equipos} />
            </Card>
            <Button darkMode={darkMode} onClick={addProduct} variant="outline">Agregar Producto</Button>
            <Button darkMode={darkMode} onClick={handleSubmit}>Guardar Proyecto</Button>
        </div>
    );
}
"#;

fn rule_set() -> RuleSet {
    RuleSet::for_prop(DEFAULT_PROP).expect("rule set")
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "proppatch".to_string(),
        version: Some("0.0.0".to_string()),
    }
}

fn write_fixture(dir: &TempDir, contents: &str) -> Utf8PathBuf {
    let path = dir.path().join("ProjectForm.jsx");
    fs::write(&path, contents).expect("write fixture");
    Utf8PathBuf::from_path_buf(path).expect("utf8 path")
}

#[test]
fn pipeline_transforms_every_target_element() {
    let outcome = run_rules(&rule_set(), FIXTURE);
    assert_eq!(outcome.buffer, PATCHED);
    assert_eq!(outcome.cleanup_matches, 0);

    // Every injection rule found exactly one occurrence in the fixture.
    for o in &outcome.outcomes {
        assert_eq!(o.matches, 1, "rule {} expected one match", o.rule_id);
    }
}

#[test]
fn pipeline_is_a_noop_on_already_patched_input() {
    let outcome = run_rules(&rule_set(), PATCHED);
    assert_eq!(outcome.buffer, PATCHED);
    assert_eq!(outcome.cleanup_matches, 0);
    for o in &outcome.outcomes {
        assert_eq!(o.matches, 0, "rule {} should not rematch", o.rule_id);
    }
}

#[test]
fn pipeline_ignores_unrelated_markup() {
    let input = "<CardStack className=\"x\">\n<InputGroup label=\"y\" />\n";
    let outcome = run_rules(&rule_set(), input);
    assert_eq!(outcome.buffer, input);
}

#[test]
fn dry_run_produces_diff_without_touching_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, FIXTURE);

    let opts = PatchOptions::default();
    assert!(opts.dry_run);

    let (report, patch) = patch_file(&path, &rule_set(), tool_info(), &opts).expect("patch");

    assert!(report.dry_run);
    assert!(report.summary.changed);
    assert_eq!(report.summary.rules_total, 9);
    assert_eq!(report.summary.rules_matched, 9);
    assert_eq!(report.summary.rules_unmatched, 0);
    assert_eq!(report.summary.replacements, 9);

    assert!(patch.contains("diff --git"));
    assert!(patch.contains("+            <Card darkMode={darkMode} className=\"md:col-span-2\">"));

    // Nothing written.
    assert_eq!(fs::read_to_string(&path).expect("read"), FIXTURE);
    let file = report.file.expect("file change");
    assert!(file.written_at.is_none());
    assert!(file.backup_path.is_none());
    assert_ne!(file.sha256_before, file.sha256_after);
}

#[test]
fn write_mode_persists_and_backs_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, FIXTURE);

    let opts = PatchOptions {
        dry_run: false,
        ..PatchOptions::default()
    };
    let (report, _patch) = patch_file(&path, &rule_set(), tool_info(), &opts).expect("patch");

    assert_eq!(fs::read_to_string(&path).expect("read"), PATCHED);

    let file = report.file.expect("file change");
    assert!(file.written_at.is_some());
    let backup = file.backup_path.expect("backup path");
    assert!(backup.ends_with(".proppatch.bak"));
    assert_eq!(fs::read_to_string(&backup).expect("read backup"), FIXTURE);
}

#[test]
fn write_mode_without_backup_leaves_no_extra_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, FIXTURE);

    let opts = PatchOptions {
        dry_run: false,
        backup_enabled: false,
        ..PatchOptions::default()
    };
    let (report, _patch) = patch_file(&path, &rule_set(), tool_info(), &opts).expect("patch");

    assert_eq!(fs::read_to_string(&path).expect("read"), PATCHED);
    assert!(report.file.expect("file change").backup_path.is_none());
    assert!(!std::path::Path::new(&format!("{}{}", path, ".proppatch.bak")).exists());
}

#[test]
fn rerunning_write_mode_is_a_noop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, PATCHED);

    let opts = PatchOptions {
        dry_run: false,
        ..PatchOptions::default()
    };
    let (report, patch) = patch_file(&path, &rule_set(), tool_info(), &opts).expect("patch");

    assert!(!report.summary.changed);
    assert!(patch.is_empty());
    assert_eq!(fs::read_to_string(&path).expect("read"), PATCHED);

    // No write, so no backup either.
    let file = report.file.expect("file change");
    assert!(file.written_at.is_none());
    assert!(file.backup_path.is_none());
    assert_eq!(file.sha256_before, file.sha256_after);
}

#[test]
fn missing_file_is_a_runtime_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("nope.jsx")).expect("utf8 path");

    let err = patch_file(&path, &rule_set(), tool_info(), &PatchOptions::default())
        .expect_err("missing file");
    assert!(matches!(err, PatchError::Runtime(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn require_matches_blocks_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Only the Card rules can match here; everything else comes up empty.
    let partial = "<Card className=\"x\">content</Card>\n";
    let path = write_fixture(&dir, partial);

    let opts = PatchOptions {
        dry_run: false,
        require_matches: true,
        ..PatchOptions::default()
    };
    let err = patch_file(&path, &rule_set(), tool_info(), &opts).expect_err("unmatched rules");

    assert!(err.is_expectation());
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("tab_button.active"));

    // The expectation fired before anything touched disk.
    assert_eq!(fs::read_to_string(&path).expect("read"), partial);
}

#[test]
fn zero_matches_without_enforcement_is_reported_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "const x = 1;\n");

    let (report, patch) =
        patch_file(&path, &rule_set(), tool_info(), &PatchOptions::default()).expect("patch");

    assert!(!report.summary.changed);
    assert_eq!(report.summary.rules_matched, 0);
    assert_eq!(report.summary.rules_unmatched, 9);
    assert!(patch.is_empty());
}

#[test]
fn duplicate_injections_collapse_through_the_pipeline() {
    // A buffer left behind by a run without the cleanup pass.
    let input = "<Card darkMode={darkMode} darkMode={darkMode} className=\"x\">\n";
    let outcome = run_rules(&rule_set(), input);
    assert_eq!(
        outcome.buffer,
        "<Card darkMode={darkMode} className=\"x\">\n"
    );
    assert_eq!(outcome.cleanup_matches, 1);
}
