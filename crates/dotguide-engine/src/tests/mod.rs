use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary guides directory for testing
pub fn create_test_guides_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test guide file with content
pub fn create_test_file(guides_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = guides_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
