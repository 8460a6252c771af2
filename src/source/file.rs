//! File-based data source.
//!
//! Polls a JSON file written by a probe's file output.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use topowatch_types::Report;

use super::{check_version, DataSource};

/// A data source that reads reports from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Report> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| format!("Read error: {}", e))
            .and_then(|content| {
                serde_json::from_str::<Report>(&content).map_err(|e| format!("Parse error: {}", e))
            });

        match result {
            Ok(report) => {
                check_version(&report, &self.description);
                self.last_error = None;
                Some(report)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to load report");
                self.last_error = Some(e);
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Report> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, don't update
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
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

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use topowatch_types::{keys, Node, PROCESS};

    fn sample_report(pid: &str) -> Report {
        Report::builder()
            .id(format!("probe-{pid}"))
            .node(
                PROCESS,
                Node::new(format!("web-1;{pid}")).with_latest(keys::process::PID, 1, pid),
            )
            .build()
    }

    fn write_report(file: &mut NamedTempFile, report: &Report) {
        let json = serde_json::to_string_pretty(report).unwrap();
        file.as_file().set_len(0).unwrap();
        std::fs::write(file.path(), json).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/report.json");
        assert_eq!(source.path(), Path::new("/tmp/report.json"));
        assert_eq!(source.description(), "file: /tmp/report.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write_report(&mut file, &sample_report("1"));

        let mut source = FileSource::new(file.path());

        // First poll should return data
        let report = source.poll().unwrap();
        assert_eq!(report, sample_report("1"));

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        write_report(&mut file, &sample_report("1"));

        let mut source = FileSource::new(file.path());
        let _ = source.poll();

        // Make sure the new mtime is strictly later than the first one
        let later = SystemTime::now() + std::time::Duration::from_secs(5);
        write_report(&mut file, &sample_report("2"));
        file.as_file().set_modified(later).unwrap();

        let report = source.poll().unwrap();
        assert!(report.process.get("web-1;2").is_some());
    }

    #[test]
    fn test_file_source_accepts_other_schema_versions() {
        let mut file = NamedTempFile::new().unwrap();
        let mut report = sample_report("4");
        report.version = topowatch_types::SchemaVersion::new(99, 0);
        write_report(&mut file, &report);

        let mut source = FileSource::new(file.path());
        assert_eq!(source.poll().map(|r| r.version.major), Some(99));
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/report.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_file_source_recovers_after_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ truncated").unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_none());

        write_report(&mut file, &sample_report("3"));
        assert!(source.poll().is_some());
        assert!(source.error().is_none());
    }
}
