use std::sync::{Arc, RwLock};

/// In-memory bearer-token holder.
///
/// Persistent storage of the token (the browser's local storage in the
/// original design) is an external collaborator; the data layer only needs
/// a shared slot it can read before each request and clear on sign-out.
/// Cloning is cheap; all clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a previously persisted token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self.token.write().expect("token lock poisoned");
        *slot = Some(token.into());
    }

    pub fn clear(&self) {
        let mut slot = self.token.write().expect("token lock poisoned");
        *slot = None;
    }

    pub fn current(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    pub fn is_present(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_slot() {
        let store = TokenStore::new();
        let clone = store.clone();
        store.set("abc");
        assert_eq!(clone.current().as_deref(), Some("abc"));
        clone.clear();
        assert!(!store.is_present());
    }
}
