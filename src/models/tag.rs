use serde::{Deserialize, Serialize};

/// A tag with follow state, as served by `/tags?name=` and the tag-to-follow
/// feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(rename = "isFollowing", default)]
    pub is_following: bool,
}

/// Bare id/name pair used by the flat all-tags list and post tag chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
}
