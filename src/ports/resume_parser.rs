// src/ports/resume_parser.rs
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use super::PortError;
use crate::app_log;
use crate::types::{BasicInfo, ResumeProfile, ResumeUpload, WorkExperience};
use crate::utils::validate_file_extension;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const PROGRESS_STEP: u8 = 10;

/// Turns an uploaded resume into structured profile data.
///
/// `progress` receives percentages in `0..=100` as the upload advances.
#[async_trait]
pub trait ResumeParser: Send + Sync {
    async fn parse(
        &self,
        upload: &ResumeUpload,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<ResumeProfile, PortError>;
}

/// Simulated upload: fixed-delay progress ticks, then a canned profile.
pub struct FixedDelayResumeParser {
    step_delay: Duration,
}

impl FixedDelayResumeParser {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    pub fn sample_profile() -> ResumeProfile {
        ResumeProfile {
            basic_info: BasicInfo {
                name: "Zhang San".to_string(),
                age: Some(28),
                email: Some("zhangsan@example.com".to_string()),
                phone: Some("13800138000".to_string()),
            },
            work_experience: WorkExperience {
                years: 5,
                current_position: Some("Frontend Engineer".to_string()),
                current_company: Some("Example Tech".to_string()),
            },
            skills: vec![
                "JavaScript".to_string(),
                "React".to_string(),
                "Node.js".to_string(),
                "TypeScript".to_string(),
            ],
        }
    }

    fn validate(upload: &ResumeUpload) -> Result<(), PortError> {
        validate_file_extension(&upload.file_name, ALLOWED_EXTENSIONS)
            .map_err(|e| PortError::InvalidInput(e.to_string()))?;

        if upload.size_bytes > MAX_UPLOAD_BYTES {
            return Err(PortError::InvalidInput(format!(
                "File too large: {} bytes (max {})",
                upload.size_bytes, MAX_UPLOAD_BYTES
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ResumeParser for FixedDelayResumeParser {
    async fn parse(
        &self,
        upload: &ResumeUpload,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<ResumeProfile, PortError> {
        Self::validate(upload)?;
        app_log!(info, "Uploading resume {}", upload.file_name);

        for percent in (0u8..=100).step_by(PROGRESS_STEP as usize) {
            sleep(self.step_delay).await;
            progress(percent);
        }

        app_log!(info, "Resume {} parsed", upload.file_name);
        Ok(Self::sample_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_progress_ticks_in_steps_of_ten() {
        let parser = FixedDelayResumeParser::new(Duration::ZERO);
        let seen = Mutex::new(Vec::new());

        let profile = parser
            .parse(&ResumeUpload::new("cv.pdf", 1024), &|p: u8| {
                seen.lock().unwrap().push(p)
            })
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        assert_eq!(profile.skills.len(), 4);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let parser = FixedDelayResumeParser::new(Duration::ZERO);
        let err = parser
            .parse(&ResumeUpload::new("cv.png", 10), &|_: u8| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::InvalidInput(_)));
        assert!(!err.should_retry());
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let parser = FixedDelayResumeParser::new(Duration::ZERO);
        let err = parser
            .parse(&ResumeUpload::new("cv.docx", MAX_UPLOAD_BYTES + 1), &|_: u8| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::InvalidInput(_)));
    }
}
