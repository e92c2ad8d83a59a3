// src/notification/source.rs
//! Where notifications come from: the built-in demo feed or a CSV export

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use super::{Importance, Notification, NotificationKind, Sender};
use crate::app_log;
use crate::core::FsOps;
use crate::ports::PortError;

#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Notification>, PortError>;
}

// ===== Built-in demo feed =====

pub struct MockMessageSource {
    delay: Duration,
}

impl MockMessageSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn sender(id: &str, name: &str, avatar: Option<&str>) -> Option<Sender> {
    Some(Sender {
        id: id.to_string(),
        name: name.to_string(),
        avatar: avatar.map(str::to_string),
    })
}

/// Five messages, three of them unread.
pub fn demo_messages() -> Vec<Notification> {
    vec![
        Notification {
            id: "1".to_string(),
            kind: NotificationKind::Interview,
            title: "Interview invitation: ByteDance frontend engineer".to_string(),
            content: "Your resume passed the first screening for the frontend engineer role. \
                      Please pick an interview slot in the app."
                .to_string(),
            is_read: false,
            importance: Importance::High,
            timestamp: at(2025, 3, 7, 14, 30),
            action_url: Some("/interview/123".to_string()),
            sender: sender(
                "byte123",
                "ByteDance",
                Some("https://img.example.com/avatars/bytedance.png"),
            ),
        },
        Notification {
            id: "2".to_string(),
            kind: NotificationKind::Application,
            title: "Resume viewed: Alibaba".to_string(),
            content: "The recruiter for the technical expert role has viewed your resume. \
                      Keep an eye on your messages for updates."
                .to_string(),
            is_read: true,
            importance: Importance::Medium,
            timestamp: at(2025, 3, 6, 9, 15),
            action_url: Some("/applications/456".to_string()),
            sender: sender(
                "ali456",
                "Alibaba",
                Some("https://img.example.com/avatars/alibaba.png"),
            ),
        },
        Notification {
            id: "3".to_string(),
            kind: NotificationKind::System,
            title: "Complete your resume".to_string(),
            content: "Your resume is 85% complete. Adding projects and certificates \
                      will get you more interview invitations."
                .to_string(),
            is_read: false,
            importance: Importance::Medium,
            timestamp: at(2025, 3, 5, 16, 45),
            action_url: Some("/resume".to_string()),
            sender: sender("system", "System", None),
        },
        Notification {
            id: "4".to_string(),
            kind: NotificationKind::Message,
            title: "Message from recruiter Li".to_string(),
            content: "Hi, I'm Li from Tencent recruiting. Your profile looks interesting, \
                      could we talk about your recent projects?"
                .to_string(),
            is_read: false,
            importance: Importance::High,
            timestamp: at(2025, 3, 4, 11, 20),
            action_url: Some("/messages/789".to_string()),
            sender: sender(
                "recruiter789",
                "Li · Tencent",
                Some("https://img.example.com/avatars/tencent.png"),
            ),
        },
        Notification {
            id: "5".to_string(),
            kind: NotificationKind::Interview,
            title: "Interview rescheduled".to_string(),
            content: "Your Baidu interview moved from March 10, 3 PM to March 11, 10 AM."
                .to_string(),
            is_read: true,
            importance: Importance::High,
            timestamp: at(2025, 3, 3, 13, 50),
            action_url: Some("/interview/321".to_string()),
            sender: sender(
                "baidu321",
                "Baidu",
                Some("https://img.example.com/avatars/baidu.png"),
            ),
        },
    ]
}

#[async_trait]
impl MessageSource for MockMessageSource {
    async fn fetch(&self) -> Result<Vec<Notification>, PortError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        Ok(demo_messages())
    }
}

// ===== CSV feed =====

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: Option<String>,
    kind: NotificationKind,
    title: String,
    content: String,
    is_read: bool,
    importance: Importance,
    timestamp: DateTime<Utc>,
    action_url: Option<String>,
    sender_id: Option<String>,
    sender_name: Option<String>,
    sender_avatar: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<CsvRow> for Notification {
    fn from(row: CsvRow) -> Self {
        let sender = non_empty(row.sender_name).map(|name| Sender {
            id: non_empty(row.sender_id).unwrap_or_default(),
            name,
            avatar: non_empty(row.sender_avatar),
        });

        Self {
            id: non_empty(row.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: row.kind,
            title: row.title,
            content: row.content,
            is_read: row.is_read,
            importance: row.importance,
            timestamp: row.timestamp,
            action_url: non_empty(row.action_url),
            sender,
        }
    }
}

/// Reads notifications from a CSV file with a header row:
/// `id,kind,title,content,is_read,importance,timestamp,action_url,sender_id,sender_name,sender_avatar`.
///
/// Rows that fail to parse, and rows repeating an earlier id, are skipped.
pub struct CsvMessageSource {
    path: PathBuf,
}

impl CsvMessageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(content: &str) -> Vec<Notification> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut seen = HashSet::new();
        let mut messages = Vec::new();
        let mut skipped = 0;

        for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
            match result {
                Ok(row) => {
                    let message = Notification::from(row);
                    if seen.insert(message.id.clone()) {
                        messages.push(message);
                    } else {
                        skipped += 1;
                        app_log!(warn, "Skipping duplicate message id: {}", message.id);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    app_log!(warn, "Skipping CSV record {}: {}", line + 1, e);
                }
            }
        }

        app_log!(
            info,
            "Parsed {} messages from CSV ({} skipped)",
            messages.len(),
            skipped
        );
        messages
    }
}

#[async_trait]
impl MessageSource for CsvMessageSource {
    async fn fetch(&self) -> Result<Vec<Notification>, PortError> {
        let content = FsOps::read_file_safe(&self.path)
            .await
            .map_err(|e| PortError::InvalidInput(format!("{:#}", e)))?;
        Ok(Self::parse(&content))
    }
}
