// src/notification/mod.rs
//! Notification store: the message list and its unread counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::app_log;
use crate::ports::{with_retry, PortError, RetryPolicy};

pub mod source;

pub use source::{CsvMessageSource, MessageSource, MockMessageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    System,
    Interview,
    Application,
    Message,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::System,
        NotificationKind::Interview,
        NotificationKind::Application,
        NotificationKind::Message,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::System => "system",
            NotificationKind::Interview => "interview",
            NotificationKind::Application => "application",
            NotificationKind::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown notification type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub importance: Importance,
    pub timestamp: DateTime<Utc>,
    pub action_url: Option<String>,
    pub sender: Option<Sender>,
}

impl Notification {
    fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
    }
}

/// Message center sidebar selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFilter {
    #[default]
    All,
    Unread,
    Kind(NotificationKind),
}

impl MessageFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            MessageFilter::All => true,
            MessageFilter::Unread => !notification.is_read,
            MessageFilter::Kind(kind) => notification.kind == *kind,
        }
    }
}

impl FromStr for MessageFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(MessageFilter::All),
            "unread" => Ok(MessageFilter::Unread),
            other => other.parse().map(MessageFilter::Kind),
        }
    }
}

#[derive(Debug, Default)]
pub struct NotificationStore {
    messages: Vec<Notification>,
    unread: usize,
    retry: RetryPolicy,
}

impl NotificationStore {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            messages: Vec::new(),
            unread: 0,
            retry,
        }
    }

    /// Replace the list with whatever `source` returns. On failure the store
    /// is left empty and the error is handed back to the caller.
    pub async fn load(&mut self, source: &dyn MessageSource) -> Result<usize, PortError> {
        match with_retry(self.retry, "fetch messages", || source.fetch()).await {
            Ok(messages) => {
                self.replace(messages);
                app_log!(
                    info,
                    "Loaded {} messages ({} unread)",
                    self.messages.len(),
                    self.unread
                );
                Ok(self.messages.len())
            }
            Err(e) => {
                self.replace(Vec::new());
                Err(e)
            }
        }
    }

    /// Seed the store directly, bypassing any source.
    pub fn replace(&mut self, messages: Vec<Notification>) {
        self.messages = messages;
        self.unread = self.recount();
    }

    pub fn messages(&self) -> &[Notification] {
        &self.messages
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn mark_as_read(&mut self, id: &str) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            if !message.is_read {
                message.is_read = true;
                self.unread -= 1;
            }
        }
        self.check_invariant();
    }

    pub fn mark_all_as_read(&mut self) {
        for message in &mut self.messages {
            message.is_read = true;
        }
        self.unread = 0;
        self.check_invariant();
    }

    pub fn delete_message(&mut self, id: &str) {
        if let Some(index) = self.messages.iter().position(|m| m.id == id) {
            let removed = self.messages.remove(index);
            if !removed.is_read {
                self.unread -= 1;
            }
            app_log!(debug, "Deleted message {}", id);
        }
        self.check_invariant();
    }

    /// Mark a message as read and return it so the host can show it and
    /// follow its `action_url`.
    pub fn open(&mut self, id: &str) -> Option<&Notification> {
        self.mark_as_read(id);
        self.get(id)
    }

    /// Messages passing `filter` whose title or content contains `search`
    /// (case-insensitive), in list order.
    pub fn filtered(&self, filter: MessageFilter, search: &str) -> Vec<&Notification> {
        let needle = search.trim().to_lowercase();
        self.messages
            .iter()
            .filter(|m| filter.matches(m))
            .filter(|m| m.matches_search(&needle))
            .collect()
    }

    pub fn count_by_kind(&self, kind: NotificationKind) -> usize {
        self.messages.iter().filter(|m| m.kind == kind).count()
    }

    /// Newest `limit` messages first.
    pub fn recent(&self, limit: usize) -> Vec<&Notification> {
        let mut sorted: Vec<&Notification> = self.messages.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted.truncate(limit);
        sorted
    }

    fn recount(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_read).count()
    }

    fn check_invariant(&self) {
        debug_assert_eq!(self.unread, self.recount(), "unread counter drifted");
    }
}
