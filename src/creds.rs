// file: src/creds.rs
// description: credential provider abstraction for the push connection and REST client

use std::path::PathBuf;

/// Source of the bearer credential attached to outbound requests.
///
/// Implementations read the current token at call time rather than capturing
/// it at construction, so a rotated token is picked up on the next connect or
/// fetch without restarting anything.
pub trait CredentialProvider: Send + Sync {
    /// Returns the current bearer token, or `None` when unauthenticated.
    fn token(&self) -> Option<String>;
}

/// Reads the token from an environment variable on every call.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}

/// Reads the token from a file on every call. Missing or empty file means
/// unauthenticated, not an error.
pub struct TokenFileCredentials {
    path: PathBuf,
}

impl TokenFileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for TokenFileCredentials {
    fn token(&self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Fixed token, mainly for tests.
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl CredentialProvider for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
