//! Whole-file rewrites on realistic sources, through the real filesystem.

use rewrite_sweep::{DriverOptions, FileDriver, FsStore, SweepConfig, TransformKind};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAPPER: &str = r#"use std::path::PathBuf;

impl AudiobookMapper {
    /// Map a database row to an Audiobook entity
    pub fn audiobook_from_row(row: &Row) -> DbResult<Audiobook> {
        Ok(Audiobook {
            id: row.get(0).map_err(|e| DatabaseError::ExecutionFailed {
                message: format!("Failed to get audiobook id: {e}"),
            })?,
            path: {
                let path_str: String = row.get(2).map_err(|e| DatabaseError::ExecutionFailed {
                    message: format!("Failed to get path: {e}"),
                })?;
                PathBuf::from(path_str)
            },
            title: row.get(3)?,
            cover_art: row.get::<_, Option<Vec<u8>>>(10)?,
            updated_at: row.get(12)?,
        })
    }

    pub fn placeholder(id: &str) -> DbResult<Audiobook> {
        Ok(Audiobook { id: id.to_string(), title: None })
    }

    pub fn selected_copy(book: &Audiobook) -> DbResult<Audiobook> {
        Ok(Audiobook { selected: true, ..book.clone() })
    }
}
"#;

const MAPPER_EXPECTED: &str = r#"use std::path::PathBuf;

impl AudiobookMapper {
    /// Map a database row to an Audiobook entity
    pub fn audiobook_from_row(row: &Row) -> DbResult<Audiobook> {
        Ok(Audiobook {
            id: row.get(0).map_err(|e| DatabaseError::ExecutionFailed {
                message: format!("Failed to get audiobook id: {e}"),
            })?,
            path: {
                let path_str: String = row.get(2).map_err(|e| DatabaseError::ExecutionFailed {
                    message: format!("Failed to get path: {e}"),
                })?;
                PathBuf::from(path_str)
            },
            title: row.get(3)?,
            cover_art: row.get::<_, Option<Vec<u8>>>(10)?,
            updated_at: row.get(12)?,
            selected: false,
        })
    }

    pub fn placeholder(id: &str) -> DbResult<Audiobook> {
        Ok(Audiobook { id: id.to_string(), title: None,
                        selected: false,
                    })
    }

    pub fn selected_copy(book: &Audiobook) -> DbResult<Audiobook> {
        Ok(Audiobook { selected: true, ..book.clone() })
    }
}
"#;

const TOOLBAR: &str = r#"impl MainToolbar {
    /// A properly styled toolbar element
    #[must_use]
    pub fn view<'a>(&self, tokens: &'a Tokens) -> Element<'a, Message> {
        row![].into()
    }

    /// Validate the scan directory
    #[must_use]
    pub fn validate(path: &Path) -> Result<PathBuf, ToolbarError> {
        Ok(path.to_path_buf())
    }

    #[must_use]
    #[must_use]
    pub(crate) async fn scan(&self, dirs: Vec<PathBuf>) -> anyhow::Result<usize> {
        Ok(dirs.len())
    }
}
"#;

const TOOLBAR_EXPECTED: &str = r#"impl MainToolbar {
    /// A properly styled toolbar element
    #[must_use]
    pub fn view<'a>(&self, tokens: &'a Tokens) -> Element<'a, Message> {
        row![].into()
    }

    /// Validate the scan directory
    pub fn validate(path: &Path) -> Result<PathBuf, ToolbarError> {
        Ok(path.to_path_buf())
    }

    pub(crate) async fn scan(&self, dirs: Vec<PathBuf>) -> anyhow::Result<usize> {
        Ok(dirs.len())
    }
}
"#;

fn setup_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn driver(kind: TransformKind) -> FileDriver {
    let transform = kind.build(&SweepConfig::default()).unwrap();
    let options = DriverOptions {
        validate: true,
        ..DriverOptions::default()
    };
    FileDriver::new(transform, FsStore, options)
}

fn process(kind: TransformKind, path: &Path) -> bool {
    driver(kind).process(path).unwrap().modified
}

#[test]
fn test_insert_field_in_mapper_file() {
    let (_dir, path) = setup_file("mappers.rs", MAPPER);

    let result = driver(TransformKind::InsertField).process(&path).unwrap();

    assert!(result.modified);
    assert_eq!(result.matches, 3);
    assert_eq!(result.rewrites, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), MAPPER_EXPECTED);
}

#[test]
fn test_strip_attribute_in_toolbar_file() {
    let (_dir, path) = setup_file("main_toolbar.rs", TOOLBAR);

    assert!(process(TransformKind::StripAttribute, &path));
    assert_eq!(fs::read_to_string(&path).unwrap(), TOOLBAR_EXPECTED);
}

#[test]
fn test_second_pass_changes_nothing() {
    for (kind, content) in [
        (TransformKind::InsertField, MAPPER),
        (TransformKind::StripAttribute, TOOLBAR),
    ] {
        let (_dir, path) = setup_file("lib.rs", content);
        assert!(process(kind, &path));

        let once = fs::read_to_string(&path).unwrap();
        assert!(!process(kind, &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), once);
    }
}

#[test]
fn test_transforms_do_not_interfere() {
    let (_dir, path) = setup_file("lib.rs", &format!("{TOOLBAR}\n{MAPPER}"));

    assert!(process(TransformKind::StripAttribute, &path));
    assert!(process(TransformKind::InsertField, &path));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("{TOOLBAR_EXPECTED}\n{MAPPER_EXPECTED}")
    );
}

#[test]
fn test_unrelated_file_is_untouched() {
    let content = "//! Nothing to see\n\npub fn main() {\n    println!(\"{}\", 1);\n}\n";
    let (_dir, path) = setup_file("main.rs", content);
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    for kind in [TransformKind::StripAttribute, TransformKind::InsertField] {
        assert!(!process(kind, &path));
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), content);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn test_dry_run_leaves_file_alone() {
    let (_dir, path) = setup_file("mappers.rs", MAPPER);
    let transform = TransformKind::InsertField
        .build(&SweepConfig::default())
        .unwrap();
    let options = DriverOptions {
        dry_run: true,
        keep_changes: true,
        ..DriverOptions::default()
    };

    let result = FileDriver::new(transform, FsStore, options)
        .process(&path)
        .unwrap();

    assert!(result.modified);
    assert_eq!(result.change.unwrap().after, MAPPER_EXPECTED);
    assert_eq!(fs::read_to_string(&path).unwrap(), MAPPER);
}
