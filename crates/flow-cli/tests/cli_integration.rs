//! Integration tests for the pipeline behind the `classflow` commands.

use flow_cli::{FileFilter, collect_source_files, extract, parse_project};
use flow_core::config::FlowConfig;
use flow_core::error::FlowError;
use flow_core::graph::OrderStrategy;
use flow_core::storage;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn account_project(root: &Path) {
    write(
        root,
        "src/com/example/app/CreateAccount.java",
        r#"package com.example.app;

import com.example.service.AccountService;

public class CreateAccount {
    private int attempts;

    void create() {
        AccountService svc = new AccountService();
        svc.openAccount();
    }
}
"#,
    );
    write(
        root,
        "src/com/example/service/AccountService.java",
        r#"package com.example.service;

public class AccountService {
    void openAccount() {
        Helper.log("opening");
    }
}
"#,
    );
    write(
        root,
        "src/com/example/util/Helper.java",
        r#"package com.example.util;

public class Helper {
    static void log(String s) {
        System.out.println(s);
    }
}
"#,
    );
    write(root, "README.md", "not java\n");
}

fn filter() -> FileFilter {
    FileFilter::default()
}

#[test]
fn test_extract_writes_both_artifacts() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    account_project(project.path());

    let config = FlowConfig::load(project.path()).unwrap();
    let report = extract(project.path(), &config, &filter(), "CreateAccount", out.path()).unwrap();

    let sequence: Vec<String> = report.sequence.iter().map(ToString::to_string).collect();
    assert_eq!(
        sequence,
        vec![
            "com.example.app.CreateAccount",
            "com.example.service.AccountService",
            "com.example.util.Helper",
        ]
    );
    assert_eq!(report.strategy, OrderStrategy::Topological);
    assert_eq!(report.outputs.source, out.path().join("CreateAccount_flow.java"));

    let merged = fs::read_to_string(&report.outputs.source).unwrap();
    assert!(merged.starts_with("import com.example.service.AccountService;\n\n"));
    assert!(merged.contains(
        "// === 1. com.example.app.CreateAccount  (from src/com/example/app/CreateAccount.java lines 5-12)"
    ));
    assert!(merged.contains("// ---- method: create"));
    assert!(!merged.contains("private int attempts"));

    let manifest = storage::load_manifest(&report.outputs.manifest).unwrap();
    assert_eq!(manifest.target, "com.example.app.CreateAccount");
    assert_eq!(manifest.sequence.len(), 3);
    assert_eq!(manifest.sequence[1].class, "com.example.service.AccountService");
    assert_eq!(manifest.sequence[1].file, "src/com/example/service/AccountService.java");
    assert_eq!(manifest.sequence[1].start_line, 3);
    assert_eq!(manifest.sequence[1].end_line, 7);
}

#[test]
fn test_regex_fallback_yields_same_sequence() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    account_project(project.path());

    let mut config = FlowConfig::load(project.path()).unwrap();
    config.extraction.force_fallback = true;
    let report = extract(project.path(), &config, &filter(), "AccountService", out.path()).unwrap();
    let names: Vec<&str> = report.sequence.iter().map(|id| id.name.as_str()).collect();
    assert_eq!(names, vec!["CreateAccount", "AccountService", "Helper"]);
}

#[test]
fn test_missing_project_is_input_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope");
    let err = parse_project(&missing, &FlowConfig::default(), &filter()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FlowError>(),
        Some(FlowError::InputNotFound(_))
    ));
}

#[test]
fn test_empty_project_has_no_sources() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(project.path(), "notes.txt", "class NotJava {}");

    let err = extract(project.path(), &FlowConfig::default(), &filter(), "NotJava", out.path())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FlowError>(),
        Some(FlowError::NoSourceFiles(_))
    ));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_target_writes_nothing() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    account_project(project.path());

    let err = extract(project.path(), &FlowConfig::default(), &filter(), "Gateway", out.path())
        .unwrap_err();
    match err.downcast_ref::<FlowError>() {
        Some(FlowError::TargetNotFound { sample, .. }) => assert_eq!(sample.len(), 3),
        other => panic!("expected TargetNotFound, got {:?}", other),
    }
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_discovery_filters_and_ignore_file() {
    let project = tempfile::tempdir().unwrap();
    account_project(project.path());
    write(project.path(), "build/Generated.java", "class Generated {}");
    write(project.path(), "test/HelperTest.java", "class HelperTest {}");
    write(project.path(), ".classflowignore", "build/\n");

    let config = FlowConfig::default();
    let all = collect_source_files(project.path(), &config, &filter()).unwrap();
    let paths: Vec<String> = all.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "src/com/example/app/CreateAccount.java",
            "src/com/example/service/AccountService.java",
            "src/com/example/util/Helper.java",
            "test/HelperTest.java",
        ]
    );

    let only_src = FileFilter {
        include: vec!["src/**".to_string()],
        exclude: vec!["**/util/**".to_string()],
    };
    let some = collect_source_files(project.path(), &config, &only_src).unwrap();
    assert_eq!(some.len(), 2);

    let bad = FileFilter {
        include: vec!["src/[".to_string()],
        exclude: Vec::new(),
    };
    assert!(collect_source_files(project.path(), &config, &bad).is_err());
}

#[test]
fn test_config_file_switches_to_full_classes() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    account_project(project.path());
    write(
        project.path(),
        ".classflow/config.toml",
        "[output]\nmethods_only = false\n",
    );

    let config = FlowConfig::load(project.path()).unwrap();
    assert!(!config.output.methods_only);
    let report = extract(project.path(), &config, &filter(), "CreateAccount", out.path()).unwrap();
    let merged = fs::read_to_string(&report.outputs.source).unwrap();
    assert!(merged.contains("private int attempts;"));
}
