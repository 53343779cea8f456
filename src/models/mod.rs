//! Domain models for the Chirp REST API.
//!
//! Wire field names follow the server's mixed convention (`isLiked`,
//! `nextCursor`, `created_on`); serde renames keep the Rust side idiomatic.

mod message;
mod notification;
mod page;
mod post;
mod search;
mod tag;
mod user;

pub use message::{Chat, ChatPeer, Message, Recipient};
pub use notification::{Notification, NotificationCount, NotificationPost};
pub use page::{Cursor, Page};
pub use post::{ParentPost, Post, PostAuthor};
pub use search::{SearchEnvelope, SearchResults};
pub use tag::{Tag, TagSummary};
pub use user::{
    AuthParams, AuthToken, Credentials, HANDLE_RE, Profile, ProfileUpdate, User, UserSummary,
};
