use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque pagination token returned by the server. `0` requests the first
/// page; the server decides everything else about its meaning.
pub type Cursor = u64;

/// One fetched batch of items plus the cursor for the next batch.
///
/// Items are kept as raw JSON values: the page envelope is shared by every
/// paginated resource (posts, users, tags, messages, notifications) and the
/// store never interprets item shapes. Absent `nextCursor` signals no
/// further pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<Value>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn new(data: Vec<Value>, next_cursor: Option<Cursor>) -> Self {
        Self { data, next_cursor }
    }
}
