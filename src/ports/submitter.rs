// src/ports/submitter.rs
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use super::PortError;
use crate::app_log;
use crate::types::{ApplicationReceipt, JobApplication};

#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(&self, application: &JobApplication) -> Result<ApplicationReceipt, PortError>;
}

/// Accepts every well-formed application after a fixed delay.
pub struct FixedDelaySubmitter {
    delay: Duration,
}

impl FixedDelaySubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ApplicationSubmitter for FixedDelaySubmitter {
    async fn submit(&self, application: &JobApplication) -> Result<ApplicationReceipt, PortError> {
        if application.job_id.trim().is_empty() {
            return Err(PortError::InvalidInput("Job id is required".to_string()));
        }

        app_log!(
            info,
            "Submitting application for job {} as {}",
            application.job_id,
            application.applicant_email
        );
        sleep(self.delay).await;

        Ok(ApplicationReceipt {
            application_id: Uuid::new_v4(),
            job_id: application.job_id.clone(),
            submitted_at: Utc::now(),
        })
    }
}
