use std::fmt;

/// One scalar component of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Text(String),
    Num(i64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Text(s) => f.write_str(s),
            KeyPart::Num(n) => write!(f, "{n}"),
        }
    }
}

/// Identifier for one cache entry: an ordered tuple of scalars with
/// structural equality.
///
/// Keys are only built through the typed constructors below, so unrelated
/// resources can never collide by accident and every call site states which
/// entry shape it addresses. The store itself treats keys as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    fn root(name: &str) -> Self {
        Self(vec![KeyPart::Text(name.to_string())])
    }

    fn scoped(name: &str, part: KeyPart) -> Self {
        Self(vec![KeyPart::Text(name.to_string()), part])
    }

    /// True when `prefix` matches the leading parts of this key; used by
    /// prefix invalidation.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    // ------------------------------------------------------------------
    // Typed key builders, one per cached resource
    // ------------------------------------------------------------------

    /// The authenticated user; removing this entry is the sign-out operation.
    pub fn auth() -> Self {
        Self::root("auth")
    }

    pub fn user(username: &str) -> Self {
        Self::scoped("user", KeyPart::Text(username.to_string()))
    }

    pub fn profile(username: &str) -> Self {
        Self::scoped("profile", KeyPart::Text(username.to_string()))
    }

    pub fn post(post_id: i64) -> Self {
        Self::scoped("post", KeyPart::Num(post_id))
    }

    pub fn post_comments(post_id: i64) -> Self {
        Self::scoped("comments", KeyPart::Num(post_id))
    }

    pub fn home_feed() -> Self {
        Self::root("home/latest")
    }

    pub fn top_feed() -> Self {
        Self::root("home/top")
    }

    pub fn user_posts(username: &str) -> Self {
        Self::scoped("user-posts", KeyPart::Text(username.to_string()))
    }

    pub fn tag(name: &str) -> Self {
        Self::scoped("tag", KeyPart::Text(name.to_string()))
    }

    pub fn tag_posts(name: &str) -> Self {
        Self::scoped("tag-posts", KeyPart::Text(name.to_string()))
    }

    pub fn all_tags() -> Self {
        Self::root("all-tags")
    }

    pub fn to_follow() -> Self {
        Self::root("widget-toFollow")
    }

    pub fn tag_to_follow() -> Self {
        Self::root("widget-tagToFollow")
    }

    pub fn followers(username: &str) -> Self {
        Self::scoped("followers", KeyPart::Text(username.to_string()))
    }

    pub fn following(username: &str) -> Self {
        Self::scoped("following", KeyPart::Text(username.to_string()))
    }

    pub fn chats() -> Self {
        Self::root("messages")
    }

    pub fn chat(username: &str) -> Self {
        Self::scoped("chat", KeyPart::Text(username.to_string()))
    }

    pub fn notifs() -> Self {
        Self::root("notifs")
    }

    pub fn notifs_count() -> Self {
        Self::root("notifs_count")
    }

    pub fn search(term: &str) -> Self {
        Self::scoped("search", KeyPart::Text(term.to_string()))
    }

    /// Prefix covering every per-conversation entry.
    pub fn chat_prefix() -> Self {
        Self::root("chat")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
