pub mod application;
pub mod resume;

pub use application::{ApplicationReceipt, JobApplication};
pub use resume::{BasicInfo, ResumeProfile, ResumeUpload, WorkExperience};
