// src/types/application.rs
//! Job application request and the receipt returned on submission

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub job_id: String,
    pub applicant_email: String,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationReceipt {
    pub application_id: Uuid,
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
}
