//! Tree runs over mock project layouts.

use rewrite_sweep::{
    DriverOptions, FailurePolicy, FileDriver, FileEnumerator, FsStore, SweepConfig,
    TransformKind, TreeWalker,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_mock_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("src/db/repositories")).unwrap();
    fs::create_dir_all(root.join("target/debug/build")).unwrap();

    fs::write(
        root.join("src/db/mappers.rs"),
        "pub fn from_row(row: &Row) -> DbResult<Audiobook> {\n    Ok(Audiobook {\n        id: row.get(0)?,\n    })\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/db/repositories/audiobook.rs"),
        "pub fn fake() -> DbResult<Audiobook> {\n    Ok(Audiobook { id: String::new() })\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/db/mod.rs"),
        "pub fn done() -> DbResult<Audiobook> {\n    Ok(Audiobook { id: String::new(), selected: false })\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("target/debug/build/generated.rs"),
        "pub fn gen() -> R { Ok(Audiobook { id: 1 }) }\n",
    )
    .unwrap();
    fs::write(root.join("README.md"), "Ok(Audiobook { id: 1 })\n").unwrap();

    dir
}

fn walker(kind: TransformKind, config: &SweepConfig, policy: FailurePolicy) -> TreeWalker {
    let driver = FileDriver::new(
        kind.build(config).unwrap(),
        FsStore,
        DriverOptions {
            validate: true,
            ..DriverOptions::default()
        },
    );
    TreeWalker::new(driver, FileEnumerator::from_settings(&config.walk), policy)
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn test_three_files_two_modified() {
    let project = setup_mock_project();
    let root = project.path();
    let config = SweepConfig::default();

    let summary = walker(TransformKind::InsertField, &config, FailurePolicy::FailFast)
        .run(root)
        .unwrap();

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.modified_count(), 2);
    assert!(read(root, "src/db/mappers.rs").contains("        selected: false,\n    })"));
    assert!(read(root, "src/db/repositories/audiobook.rs").contains("selected: false,"));
    assert_eq!(
        read(root, "target/debug/build/generated.rs"),
        "pub fn gen() -> R { Ok(Audiobook { id: 1 }) }\n"
    );
    assert_eq!(read(root, "README.md"), "Ok(Audiobook { id: 1 })\n");
}

#[test]
fn test_second_run_modifies_nothing() {
    let project = setup_mock_project();
    let config = SweepConfig::default();

    let first = walker(TransformKind::InsertField, &config, FailurePolicy::FailFast)
        .run(project.path())
        .unwrap();
    let second = walker(TransformKind::InsertField, &config, FailurePolicy::FailFast)
        .run(project.path())
        .unwrap();

    assert_eq!(first.modified_count(), 2);
    assert_eq!(second.modified_count(), 0);
    assert_eq!(second.scanned, 3);
}

#[test]
fn test_configured_extensions_and_excludes() {
    let project = setup_mock_project();
    let root = project.path();
    let config = rewrite_sweep::load_from_str(
        r#"
[walk]
extensions = ["rs", "md"]
exclude = ["repositories"]
"#,
    )
    .unwrap();

    let summary = walker(TransformKind::InsertField, &config, FailurePolicy::FailFast)
        .run(root)
        .unwrap();

    let modified: Vec<_> = summary
        .modified_paths()
        .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        modified,
        vec![
            Path::new("README.md").to_path_buf(),
            Path::new("src/db/mappers.rs").to_path_buf(),
            Path::new("target/debug/build/generated.rs").to_path_buf(),
        ]
    );
    assert!(!read(root, "src/db/repositories/audiobook.rs").contains("selected"));
}

#[test]
fn test_keep_going_skips_unreadable_file() {
    let project = setup_mock_project();
    let root = project.path();
    fs::write(root.join("src/db/broken.rs"), [0xc3, 0x28]).unwrap();
    let config = SweepConfig::default();

    let summary = walker(TransformKind::InsertField, &config, FailurePolicy::KeepGoing)
        .run(root)
        .unwrap();

    assert_eq!(summary.scanned, 4);
    assert_eq!(summary.modified_count(), 2);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].path.ends_with("src/db/broken.rs"));
}

#[test]
fn test_fail_fast_keeps_earlier_writes() {
    let project = setup_mock_project();
    let root = project.path();
    // Walked after mappers.rs and mod.rs, before repositories/
    fs::write(root.join("src/db/n_broken.rs"), [0xc3, 0x28]).unwrap();
    let config = SweepConfig::default();

    let result = walker(TransformKind::InsertField, &config, FailurePolicy::FailFast).run(root);

    assert!(result.is_err());
    assert!(read(root, "src/db/mappers.rs").contains("selected: false,"));
    assert!(!read(root, "src/db/repositories/audiobook.rs").contains("selected"));
}

#[test]
fn test_validation_failure_is_reported_not_written() {
    let project = setup_mock_project();
    let root = project.path();
    let doc = "// Ok(Audiobook { id: 1 })\npub fn f() {}\n";
    fs::write(root.join("src/doc.rs"), doc).unwrap();
    let config = SweepConfig::default();

    let summary = walker(TransformKind::InsertField, &config, FailurePolicy::KeepGoing)
        .run(root)
        .unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].message.contains("refusing to write"));
    assert_eq!(read(root, "src/doc.rs"), doc);
}
