use relative_path::{RelativePath, RelativePathBuf};

use crate::io::GUIDE_EXTENSION;

/// A guide document with a relative path and display-friendly name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GuideFile {
    relative_path: RelativePathBuf,
    display_name: String,
}

impl GuideFile {
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let display_name = Self::extract_display_name(&relative_path);
        Self {
            relative_path,
            display_name,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the guide extension
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    fn extract_display_name(path: &RelativePath) -> String {
        path.file_stem()
            .filter(|_| path.extension() == Some(GUIDE_EXTENSION))
            .or_else(|| path.file_name())
            .unwrap_or("Untitled")
            .to_string()
    }
}

impl From<RelativePathBuf> for GuideFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for GuideFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}
