#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

use std::collections::BTreeMap;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::ParticipantsBySource;
use crate::domain::models::ProcessingReport;
use crate::domain::models::RemoteArc;
use crate::domain::models::RemoteError;

/// Thin front for the service's bulk processing job and the year and
/// participant lookups that depend on it.
#[derive(Clone)]
pub struct Pipeline {
    remote: RemoteArc,
}

impl Pipeline {
    pub fn new(remote: RemoteArc) -> Pipeline {
        return Pipeline { remote };
    }

    /// Runs bulk processing. The error is a single user facing notice.
    pub async fn request_processing(&self) -> Result<ProcessingReport> {
        match self.remote.process_data().await {
            Ok(mut report) => {
                report.available_years.sort();
                report.available_years.dedup();
                tracing::debug!(
                    years = ?report.available_years,
                    unprocessed = ?report.unprocessed_files,
                    "Processing finished"
                );
                return Ok(report);
            }
            Err(RemoteError::Transport(err)) => {
                tracing::error!(error = err, "Processing request failed");
                bail!(format!("Network error during data processing: {err}"));
            }
            Err(err) => {
                tracing::error!(error = ?err, "Processing rejected");
                bail!(format!("Data processing failed: {err}"));
            }
        }
    }

    /// Years with processed data, oldest first. Empty when the service can't
    /// be asked.
    pub async fn available_years(&self) -> Vec<i32> {
        match self.remote.available_years().await {
            Ok(mut years) => {
                years.sort();
                years.dedup();
                return years;
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to fetch available years");
                return vec![];
            }
        }
    }

    /// Candidate participants for a year. A failed lookup counts as having no
    /// candidates at all.
    pub async fn participants(&self, year: i32) -> ParticipantsBySource {
        match self.remote.participants(year).await {
            Ok(res) => {
                return res.participants_by_source;
            }
            Err(err) => {
                tracing::warn!(year = year, error = ?err, "Failed to fetch participants");
                return ParticipantsBySource::new();
            }
        }
    }

    pub async fn processed_files(&self) -> Result<BTreeMap<String, Vec<String>>> {
        return Ok(self.remote.processed_files().await?);
    }

    pub async fn clear_uploads(&self) -> Result<String> {
        let ack = self.remote.clear_uploaded_files().await?;
        return Ok(ack.message);
    }
}
