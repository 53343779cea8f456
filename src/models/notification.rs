use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An activity notification (like, follow, comment, mention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub subject: String,
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Partial user projection; shape varies by notification subject.
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub post: Option<NotificationPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPost {
    pub id: i64,
    pub body: String,
}

/// Unread-count payload polled from `/notifications/count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCount {
    pub count: u64,
}
