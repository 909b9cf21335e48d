//! Token store double.

use vitalis_core::TokenStore;

/// Always returns the token it was built with.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    /// A store holding `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A store with no session.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl TokenStore for StaticTokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
