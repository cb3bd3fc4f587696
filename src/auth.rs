//! Shared bearer-token cell. The HTTP client reads the token on every
//! request and clears it when the server answers 401, so the next launch of
//! an auth flow starts clean.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct AuthTokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap() = Some(token.into());
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    pub fn clear(&self) {
        *self.token.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_cell() {
        let store = AuthTokenStore::new();
        let view = store.clone();
        store.set_token("abc");
        assert_eq!(view.token().as_deref(), Some("abc"));
        view.clear();
        assert_eq!(store.token(), None);
    }
}
