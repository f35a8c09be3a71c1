//! Run Output
//!
//! Writes the final document and a JSON run report next to it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::controller::{RunOutcome, RunStatus};
use crate::types::{IterationMetric, Result};

/// Report persisted alongside the document
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub final_length: usize,
    pub metrics: Vec<IterationMetric>,
}

/// Paths written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOutput {
    pub run_id: Uuid,
    pub document: PathBuf,
    pub report: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    document_path: PathBuf,
}

impl OutputWriter {
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// `docs.md` → `docs.report.json`
    pub fn report_path(&self) -> PathBuf {
        let stem = self
            .document_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("documentation");
        self.document_path
            .with_file_name(format!("{}.report.json", stem))
    }

    pub async fn write(&self, outcome: &RunOutcome) -> Result<PersistedOutput> {
        if let Some(parent) = self.document_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.document_path, &outcome.documentation).await?;

        let report = RunReport {
            run_id: Uuid::new_v4(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            status: outcome.status.clone(),
            final_length: outcome.documentation.chars().count(),
            metrics: outcome.metrics.clone(),
        };
        let report_path = self.report_path();
        tokio::fs::write(&report_path, serde_json::to_string_pretty(&report)?).await?;

        info!(
            run_id = %report.run_id,
            "Documentation saved to {}",
            self.document_path.display()
        );

        Ok(PersistedOutput {
            run_id: report.run_id,
            document: self.document_path.clone(),
            report: report_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn outcome() -> RunOutcome {
        let now = Utc::now();
        RunOutcome {
            documentation: "# Project\n".to_string(),
            status: RunStatus::Accepted { iteration: 2 },
            metrics: vec![IterationMetric::new(1, Duration::from_secs(3), 10)],
            decisions: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_report_path() {
        let writer = OutputWriter::new("out/docs.md");
        assert_eq!(writer.report_path(), PathBuf::from("out/docs.report.json"));
    }

    #[tokio::test]
    async fn test_write_document_and_report() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path().join("nested/docs.md"));

        let persisted = writer.write(&outcome()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&persisted.document).unwrap(), "# Project\n");

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&persisted.report).unwrap()).unwrap();
        assert_eq!(report["run_id"], persisted.run_id.to_string());
        assert_eq!(report["status"]["state"], "accepted");
        assert_eq!(report["status"]["iteration"], 2);
        assert_eq!(report["final_length"], 10);
        assert_eq!(report["metrics"][0]["draft_length"], 10);
    }
}
