// src/types/resume.rs
//! Resume data produced by the intake stage

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub basic_info: BasicInfo,
    pub work_experience: WorkExperience,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    pub age: Option<u8>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub years: u8,
    pub current_position: Option<String>,
    pub current_company: Option<String>,
}

/// A file handed to the intake stage. Only the name and size are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub size_bytes: u64,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
        }
    }
}
