//! Report delivery
//!
//! A sink takes a formatted report and a recipient list and answers, per
//! recipient, whether delivery worked. Failures never propagate.

use async_trait::async_trait;
use chrono::Local;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::report::Report;

/// Per-recipient delivery success
pub type DeliveryResult = BTreeMap<String, bool>;

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &Report, recipients: &[String]) -> DeliveryResult;
}

/// Mark every recipient with the same outcome
fn mark_all(recipients: &[String], delivered: bool) -> DeliveryResult {
    recipients.iter().map(|r| (r.clone(), delivered)).collect()
}

/// Writes reports to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReportSink;

#[async_trait]
impl ReportSink for LogReportSink {
    async fn deliver(&self, report: &Report, recipients: &[String]) -> DeliveryResult {
        if recipients.is_empty() {
            warn!("No report recipients configured");
            return DeliveryResult::new();
        }

        info!(recipients = %recipients.join(", "), "{}\n{}", report.subject, report.body);
        mark_all(recipients, true)
    }
}

/// Writes each report once to `<dir>/<timestamp>-report.txt`
#[derive(Debug, Clone)]
pub struct FileReportSink {
    directory: PathBuf,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn write(&self, report: &Report, recipients: &[String]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let file_name = format!("{}-report.txt", Local::now().format("%Y%m%dT%H%M%S%.3f"));
        let path = self.directory.join(file_name);
        let contents = format!(
            "To: {}\nSubject: {}\n\n{}",
            recipients.join(", "),
            report.subject,
            report.body
        );
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn deliver(&self, report: &Report, recipients: &[String]) -> DeliveryResult {
        if recipients.is_empty() {
            warn!("No report recipients configured");
            return DeliveryResult::new();
        }

        match self.write(report, recipients).await {
            Ok(path) => {
                info!("Report written to {}", path.display());
                mark_all(recipients, true)
            }
            Err(e) => {
                error!("Failed to write report to {}: {}", self.directory.display(), e);
                mark_all(recipients, false)
            }
        }
    }
}
