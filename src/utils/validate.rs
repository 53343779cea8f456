//! Client-side validation of user input.
//!
//! Validation failures block the mutating call locally and surface inline
//! field errors; they never reach the network.

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::HANDLE_RE;

/// Maximum plain-text length of a post or comment body.
pub const POST_MAX_CHARS: usize = 250;

/// Tag name length bounds.
pub const TAG_MIN_CHARS: usize = 2;
pub const TAG_MAX_CHARS: usize = 32;

/// Plain-text length of a rich-text document.
///
/// The editor serializes either a flat `{"body": "..."}` or a block
/// document `{"blocks": [{"text": "..."}, ...]}`; plain text is the block
/// texts joined by newlines, counted in characters.
pub fn plain_text_len(doc: &Value) -> usize {
    if let Some(body) = doc.get("body").and_then(Value::as_str) {
        return body.chars().count();
    }
    let Some(blocks) = doc.get("blocks").and_then(Value::as_array) else {
        return 0;
    };
    let text_len: usize = blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .map(|text| text.chars().count())
        .sum();
    let separators = blocks.len().saturating_sub(1);
    text_len + separators
}

/// Plain-text body of a rich-text document, for optimistic synthesis.
pub fn plain_body(doc: &Value) -> String {
    if let Some(body) = doc.get("body").and_then(Value::as_str) {
        return body.to_string();
    }
    let Some(blocks) = doc.get("blocks").and_then(Value::as_array) else {
        return String::new();
    };
    blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validates a post/comment body: non-empty, at most `POST_MAX_CHARS`
/// plain-text characters. Exactly 250 characters pass; 251 fail.
pub fn validate_post_body(doc: &Value) -> AppResult<()> {
    let len = plain_text_len(doc);
    if len == 0 {
        return Err(AppError::Validation {
            field: "post".to_string(),
            reason: "Post body must not be empty".to_string(),
        });
    }
    if len > POST_MAX_CHARS {
        return Err(AppError::Validation {
            field: "post".to_string(),
            reason: format!("Must be {POST_MAX_CHARS} characters or less"),
        });
    }
    Ok(())
}

/// Validates a message body: non-empty after trimming.
pub fn validate_message_body(body: &str) -> AppResult<()> {
    if body.trim().is_empty() {
        return Err(AppError::Validation {
            field: "message".to_string(),
            reason: "Message must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Validates a tag name: length bounds and handle charset.
pub fn validate_tag_name(name: &str) -> AppResult<()> {
    let len = name.chars().count();
    if len < TAG_MIN_CHARS {
        return Err(AppError::Validation {
            field: "tag".to_string(),
            reason: format!("Must be at least {TAG_MIN_CHARS} characters"),
        });
    }
    if len > TAG_MAX_CHARS {
        return Err(AppError::Validation {
            field: "tag".to_string(),
            reason: format!("Must be {TAG_MAX_CHARS} characters or less"),
        });
    }
    if !HANDLE_RE.is_match(name) {
        return Err(AppError::Validation {
            field: "tag".to_string(),
            reason: "Must contain only valid characters (a-z, A-Z, 0-9, and _)".to_string(),
        });
    }
    Ok(())
}
