use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Characters allowed in usernames and tag names.
pub static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]*$").expect("valid handle regex"));

/// Public profile attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    pub username: String,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
    #[serde(rename = "isFollowing", default)]
    pub is_following: Option<bool>,
}

/// A full user record as returned by `/users/auth` and `/profile/:username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub followers: i64,
    #[serde(default)]
    pub following: i64,
    #[serde(rename = "isFollowing", default)]
    pub is_following: bool,
    pub profile: Profile,
}

/// Reduced user shape used by the who-to-follow widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub profile: Profile,
    #[serde(rename = "isFollowing", default)]
    pub is_following: bool,
}

/// Bearer token returned by login/register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

/// Signup form payload. Field rules mirror the server's constraints; the
/// uniqueness of username/email is checked by a separate network round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthParams {
    #[validate(length(min = 2, max = 32, message = "Must be between 2 and 32 characters"))]
    pub name: String,

    #[validate(
        length(min = 3, max = 32, message = "Must be between 3 and 32 characters"),
        regex(
            path = *HANDLE_RE,
            message = "Must contain only valid characters (a-z, A-Z, 0-9, and _)"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Must be 8 characters or more"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Both password fields must match"))]
    pub password2: String,
}

/// Login form payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Editable profile fields sent by the edit-profile form; also the shape of
/// the optimistic merge into the cached profile entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 32, message = "Must be between 2 and 32 characters"))]
    pub name: String,

    #[validate(
        length(min = 3, max = 32, message = "Must be between 3 and 32 characters"),
        regex(
            path = *HANDLE_RE,
            message = "Must contain only valid characters (a-z, A-Z, 0-9, and _)"
        )
    )]
    pub username: String,

    #[validate(length(max = 150, message = "Must be 150 characters or less"))]
    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub dob: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,
}
