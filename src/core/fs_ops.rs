// src/core/fs_ops.rs
//! File system helpers shared by storage and the file-backed message source

use anyhow::{Context, Result};
use std::path::Path;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists
    pub fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write a file through a sibling temp file and rename, creating parents as needed
    pub fn write_file_sync(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent)?;
        }

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        std::fs::rename(&tmp, path).with_context(|| {
            format!("Failed to move {} to {}", tmp.display(), path.display())
        })?;

        app_log!(debug, "Written file: {}", path.display());
        Ok(())
    }

    /// Read file safely
    pub async fn read_file_safe(path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }
}
