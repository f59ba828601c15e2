use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use backend_domain::ports::ReportSink;
use backend_domain::SessionReport;

/// Writes session reports as pretty JSON into the report directory.
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn save_report(&self, file_stem: &str, report: &SessionReport) -> Result<String> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create {}", self.dir.display()))?;
        let path = self.dir.join(format!("{}.json", sanitize_stem(file_stem)));
        let body = serde_json::to_vec_pretty(report)?;
        fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "session report saved");
        Ok(path.to_string_lossy().to_string())
    }
}

/// Keeps report names inside the report directory.
fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{InteractionGraph, ReportScope, Timeline};

    fn empty_report() -> SessionReport {
        SessionReport {
            scope: ReportScope::characters(["alice"]).label(),
            start: 0,
            end: 60,
            class_timeline: Timeline::default(),
            vehicle_timeline: Timeline::default(),
            interaction_timeline: Timeline::default(),
            interaction_graph: InteractionGraph::default(),
        }
    }

    #[tokio::test]
    async fn writes_json_under_report_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("reports"));
        let saved = sink
            .save_report("session-report-240101-1200-60min-alice", &empty_report())
            .await
            .unwrap();
        assert!(saved.ends_with("session-report-240101-1200-60min-alice.json"));
        let body = std::fs::read_to_string(&saved).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["scope"], "alice");
    }

    #[test]
    fn stems_cannot_escape_the_directory() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "_.._etc_passwd");
    }
}
