use anyhow::{Context, Result};
use dotguide_config::ReportFormat;
use dotguide_engine::{Analysis, Analyzer, Diagnostic, Message, io};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One analysed guide file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub analysis: Analysis,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: &'a Path,
    messages: &'a [Message],
    diagnostics: &'a [Diagnostic],
}

/// Expands folders into the guide files below them; files are taken as given.
pub fn collect_guides(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = io::scan_guides(path)
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            log::debug!("{}: {} guide files", path.display(), found.len());
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(io::IoError::NotFound(path.clone()).into());
        }
    }
    Ok(files)
}

pub fn check_files(analyzer: &Analyzer<'_>, files: &[PathBuf]) -> Result<Vec<FileReport>> {
    files
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(FileReport {
                path: path.clone(),
                analysis: analyzer.run(&text),
            })
        })
        .collect()
}

pub fn render(reports: &[FileReport], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(reports)),
        ReportFormat::Json => render_json(reports),
    }
}

/// `path:line: severity: message`, then syntax markers as notes.
pub fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let path = report.path.display();
        for diagnostic in &report.analysis.diagnostics {
            out.push_str(&format!("{path}:{diagnostic}\n"));
        }
        for marker in &report.analysis.json_markers {
            out.push_str(&format!(
                "{path}:{}:{}: note: {}\n",
                marker.line, marker.column, marker.message
            ));
        }
    }
    out
}

/// One JSON object per file, one per line.
pub fn render_json(reports: &[FileReport]) -> Result<String> {
    let mut out = String::new();
    for report in reports {
        let json = serde_json::to_string(&JsonReport {
            path: &report.path,
            messages: &report.analysis.messages,
            diagnostics: &report.analysis.diagnostics,
        })?;
        out.push_str(&json);
        out.push('\n');
    }
    Ok(out)
}

pub fn has_errors(reports: &[FileReport]) -> bool {
    reports.iter().any(|report| report.analysis.has_errors())
}
