use serde::{Deserialize, Serialize};

use crate::models::TagSummary;

/// Author projection embedded in every post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub username: String,
    #[serde(rename = "isFollowing", default)]
    pub is_following: bool,
}

/// A post; comments are posts with a `parent` reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub created_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
    pub likes: i64,
    pub comments: i64,
    #[serde(default)]
    pub tags: Vec<TagSummary>,
    pub author: PostAuthor,
    #[serde(default)]
    pub parent: Option<Box<ParentPost>>,
}

/// The referenced parent of a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentPost {
    pub id: i64,
    pub body: String,
}
