//! Transforms configured from a TOML file instead of the defaults.

use rewrite_sweep::config::{load_from_path, ConfigError};
use rewrite_sweep::{
    DriverOptions, FailurePolicy, FileDriver, FileEnumerator, FsStore, TransformKind, TreeWalker,
};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[walk]
extensions = ["rs"]
exclude = ["target", "fixtures"]

[strip_attribute]
attribute = "inline"
return_type = "Outcome"

[insert_field]
wrapper = "Some"
struct_name = "Track"
field = "rating"
value = "None"
indent_width = 2
"#;

#[test]
fn test_custom_transforms_from_config_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let config_path = root.join("rewrite-sweep.toml");
    fs::write(&config_path, CONFIG).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("fixtures")).unwrap();

    let source = "\
#[inline]
fn parse(input: &str) -> Outcome<Track> {
  Some(Track {
    id: input.len(),
  })
}

#[inline]
fn keep() -> Result<()> {
  Ok(())
}
";
    fs::write(root.join("src/track.rs"), source).unwrap();
    fs::write(root.join("fixtures/track.rs"), source).unwrap();

    let config = load_from_path(&config_path).unwrap();
    for kind in [TransformKind::StripAttribute, TransformKind::InsertField] {
        let driver = FileDriver::new(
            kind.build(&config).unwrap(),
            FsStore,
            DriverOptions {
                validate: true,
                ..DriverOptions::default()
            },
        );
        let walker = TreeWalker::new(
            driver,
            FileEnumerator::from_settings(&config.walk),
            FailurePolicy::FailFast,
        );
        assert_eq!(walker.run(root).unwrap().modified_count(), 1);
    }

    assert_eq!(
        fs::read_to_string(root.join("src/track.rs")).unwrap(),
        "\
fn parse(input: &str) -> Outcome<Track> {
  Some(Track {
    id: input.len(),
    rating: None,
  })
}

#[inline]
fn keep() -> Result<()> {
  Ok(())
}
"
    );
    assert_eq!(
        fs::read_to_string(root.join("fixtures/track.rs")).unwrap(),
        source
    );
}

#[test]
fn test_invalid_identifiers_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rewrite-sweep.toml");
    fs::write(
        &path,
        "[insert_field]\nfield = \"not a field\"\nindent_width = 0\n",
    )
    .unwrap();

    let err = load_from_path(&path).unwrap_err();
    let ConfigError::Validation { source, .. } = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(source.issues.len(), 2);
}
