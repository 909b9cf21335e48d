//! Ambient client-side credential storage.

/// Source of the bearer token attached to outgoing requests.
///
/// Returns `None` when no session token is stored; requests are then sent
/// without an `Authorization` header.
pub trait TokenStore: Send + Sync {
    /// Current bearer token.
    fn bearer_token(&self) -> Option<String>;
}
