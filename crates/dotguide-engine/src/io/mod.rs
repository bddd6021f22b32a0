use crate::models::GuideFile;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// Guide documents are plain text files with this extension.
pub const GUIDE_EXTENSION: &str = "txt";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid guides directory: {0}")]
    InvalidGuidesDir(String),
}

/// Read a guide file and return its content
pub fn read_guide(relative_path: &RelativePath, guides_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(guides_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Scan for guide files in the guides directory, sorted by path
pub fn scan_guides(guides_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !guides_root.exists() {
        return Err(IoError::InvalidGuidesDir(
            "guides directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(guides_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Guide files under `guides_root`, relative to it
pub fn list_guides(guides_root: &Path) -> Result<Vec<GuideFile>, IoError> {
    let guides = scan_guides(guides_root)?
        .into_iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(guides_root).ok()?;
            RelativePathBuf::from_path(relative).ok()
        })
        .map(GuideFile::new)
        .collect();
    Ok(guides)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if is_guide(&path) {
            files.push(path);
        }
    }

    Ok(())
}

pub fn is_guide(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == GUIDE_EXTENSION)
}

pub fn validate_guides_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidGuidesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
