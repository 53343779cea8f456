use serde::{Deserialize, Serialize};

use crate::models::Profile;

/// A direct message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub body: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    pub created_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

/// A conversation summary as served by `/chats` (latest message plus the
/// peer's profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub body: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    pub created_on: String,
    #[serde(default)]
    pub user: Option<ChatPeer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPeer {
    pub id: i64,
    pub profile: Profile,
}

/// Addressing information for an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: i64,
    pub username: String,
}
