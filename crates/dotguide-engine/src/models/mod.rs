pub mod guide_file;

pub use guide_file::GuideFile;
