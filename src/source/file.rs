//! File-based data source.
//!
//! Polls a JSON file holding a saved backend response. Used for offline
//! demos and for replaying captured data.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use pikawatch_types::{MetricsResponse, NetworkByInterfaceResponse};

use super::{MetricsPayload, MetricsSource, QueryKey, SourceUpdate};

/// A data source that reads a saved response from a JSON file.
///
/// Accepts the body of either `/agents/{id}/metrics`,
/// `/monitors/{id}/history` (a `series` list) or the network-by-interface
/// endpoint (a `metrics` list). The file is re-read when its modification
/// time changes or a different key is requested.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    key: Option<QueryKey>,
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
            key: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<MetricsPayload> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return None;
            }
        };

        match parse_payload(&content) {
            Ok(payload) => {
                self.last_error = None;
                Some(payload)
            }
            Err(e) => {
                self.last_error = Some(format!("Parse error: {}", e));
                None
            }
        }
    }
}

/// Decode a saved response, telling the two shapes apart by their list key.
fn parse_payload(content: &str) -> serde_json::Result<MetricsPayload> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.get("metrics").is_some() {
        let resp: NetworkByInterfaceResponse = serde_json::from_value(value)?;
        Ok(MetricsPayload::Interfaces(resp))
    } else {
        let resp: MetricsResponse = serde_json::from_value(value)?;
        Ok(MetricsPayload::Series(resp.series))
    }
}

impl MetricsSource for FileSource {
    fn request(&mut self, key: QueryKey) {
        if self.key.as_ref() == Some(&key) {
            return;
        }
        self.key = Some(key);
        self.last_modified = None;
    }

    fn poll(&mut self) -> Option<SourceUpdate> {
        let key = self.key.clone()?;
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(payload) = self.read_file() {
                self.last_modified = current_modified;
                return Some(SourceUpdate { key, payload });
            }
        }

        None
    }

    fn refresh(&mut self) {
        self.last_modified = None;
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::cpu_key;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn metrics_json() -> &'static str {
        r#"{
            "agentId": "agent-1",
            "type": "cpu",
            "range": "1h",
            "series": [
                { "name": "usage", "data": [{ "timestamp": 1000, "value": 12.5 }] }
            ]
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/metrics.json");
        assert_eq!(source.path(), Path::new("/tmp/metrics.json"));
        assert_eq!(source.description(), "file: /tmp/metrics.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", metrics_json()).unwrap();

        let mut source = FileSource::new(file.path());

        // No key requested yet
        assert!(source.poll().is_none());

        source.request(cpu_key("agent-1"));
        let update = source.poll().unwrap();
        match update.payload {
            MetricsPayload::Series(series) => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].name, "usage");
            }
            other => panic!("unexpected payload: {:?}", other),
        }

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_rereads_on_new_key() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", metrics_json()).unwrap();

        let mut source = FileSource::new(file.path());
        source.request(cpu_key("a"));
        assert!(source.poll().is_some());
        assert!(source.poll().is_none());

        source.request(cpu_key("b"));
        assert_eq!(source.poll().unwrap().key, cpu_key("b"));

        source.refresh();
        assert!(source.poll().is_some());
    }

    #[test]
    fn test_file_source_network_by_interface() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"agentId":"a","type":"network","metrics":[{{"timestamp":1,"interface":"eth0","sentRate":1.0,"recvRate":2.0}}]}}"#
        )
        .unwrap();

        let mut source = FileSource::new(file.path());
        source.request(cpu_key("a"));
        let update = source.poll().unwrap();
        assert_eq!(update.payload.interfaces(), vec!["eth0"]);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/metrics.json");
        source.request(cpu_key("a"));

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());
        source.request(cpu_key("a"));

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
