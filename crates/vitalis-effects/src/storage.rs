//! Bearer token sources.
//!
//! Tokens are read on every request, never cached, so signing in or out in
//! another process takes effect on the next call.

use std::path::{Path, PathBuf};
use vitalis_core::TokenStore;

/// Environment variable read by [`EnvTokenStore::default`].
pub const TOKEN_ENV_VAR: &str = "VITALIS_TOKEN";

/// Reads the token from an environment variable.
#[derive(Clone, Debug)]
pub struct EnvTokenStore {
    var: String,
}

impl EnvTokenStore {
    /// Read the token from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenStore {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

impl TokenStore for EnvTokenStore {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(non_blank)
    }
}

/// Reads the token from a file holding nothing but the token.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Read the token from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/vitalis/token`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vitalis").join("token"))
    }

    /// File the token is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn bearer_token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => non_blank(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token file unreadable");
                None
            }
        }
    }
}

/// First store that has a token wins.
#[derive(Default)]
pub struct FallbackTokenStore {
    stores: Vec<Box<dyn TokenStore>>,
}

impl FallbackTokenStore {
    /// Store with no sources; never has a token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, consulted after the existing ones.
    #[must_use]
    pub fn with(mut self, store: impl TokenStore + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }
}

impl TokenStore for FallbackTokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.stores.iter().find_map(|store| store.bearer_token())
    }
}

impl std::fmt::Debug for FallbackTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackTokenStore")
            .field("stores", &self.stores.len())
            .finish()
    }
}

fn non_blank(raw: String) -> Option<String> {
    let token = raw.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_token_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  tok-123\n").unwrap();

        assert_eq!(FileTokenStore::new(&path).bearer_token().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_missing_or_blank_file_has_no_token() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileTokenStore::new(dir.path().join("absent")).bearer_token().is_none());

        let path = dir.path().join("blank");
        std::fs::write(&path, "\n").unwrap();
        assert!(FileTokenStore::new(&path).bearer_token().is_none());
    }

    #[test]
    fn test_env_store_reads_named_variable() {
        let var = "VITALIS_TEST_TOKEN_ENV_STORE";
        std::env::set_var(var, "tok-env");
        assert_eq!(EnvTokenStore::new(var).bearer_token().as_deref(), Some("tok-env"));
        std::env::remove_var(var);
        assert!(EnvTokenStore::new(var).bearer_token().is_none());
    }

    #[test]
    fn test_fallback_uses_first_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "from-file").unwrap();

        let store = FallbackTokenStore::new()
            .with(EnvTokenStore::new("VITALIS_TEST_TOKEN_UNSET"))
            .with(FileTokenStore::new(&path));
        assert_eq!(store.bearer_token().as_deref(), Some("from-file"));
    }
}
