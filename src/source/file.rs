//! File-based report source.
//!
//! Polls a JSON file and re-reads it when its modification time changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use histwatch_types::RegressionReport;

use super::DataSource;

/// Reads a regression report from a JSON file.
///
/// The file is read on the first poll and afterwards only when its
/// modification time moves forward (or a reload is requested).
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    force: bool,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            force: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<RegressionReport> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match RegressionReport::from_json(&content) {
                Ok(report) => {
                    self.last_error = None;
                    Some(report)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<RegressionReport> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed || std::mem::take(&mut self.force) {
            if let Some(report) = self.read_file() {
                self.last_modified = current_modified;
                return Some(report);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn request_reload(&mut self) {
        self.force = true;
    }
}
