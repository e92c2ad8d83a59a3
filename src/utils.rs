// src/utils.rs
use anyhow::Result;

/// Normalize a user-typed language name to a supported code, if any
pub fn normalize_language(lang: &str) -> Option<&'static str> {
    match lang.trim().to_lowercase().as_str() {
        "zh" | "zh-cn" | "chinese" | "中文" => Some("zh"),
        "en" | "en-us" | "english" | "英文" => Some("en"),
        _ => None,
    }
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

/// Split a `key=value` CLI argument
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected key=value, got: {}", arg))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty key in: {}", arg);
    }

    Ok((key.to_string(), value.trim().to_string()))
}
