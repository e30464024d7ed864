use std::fs;

use portal_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn rewriting_an_export_replaces_it() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("documents-2025-03-23.csv", "id\n1\n").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "id\n1\n");

    let second = writer.write("documents-2025-03-23.csv", "id\n2\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "id\n2\n");
}

#[test]
fn binary_content_is_written_verbatim() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let bytes = [0x25, 0x50, 0x44, 0x46, 0x00, 0xff];
    let path = writer.write_bytes("report.pdf", &bytes).unwrap();
    assert_eq!(fs::read(path).unwrap(), bytes);
}

#[test]
fn file_in_place_of_dir_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("report.pdf", "data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("report.pdf").exists());
}

#[test]
fn names_with_separators_are_refused() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("out"));
    for name in ["../up.csv", "nested/file.csv", ""] {
        let result = writer.write(name, "data");
        assert!(matches!(result, Err(PersistError::InvalidName(_))), "{name}");
    }
}
