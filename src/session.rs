//! Session State Management
//!
//! Tracks the bearer token and the user it was issued to.

/// Authentication state owned by the client.
///
/// The username is only known after an interactive login; a session restored
/// from durable storage carries the token alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session restored from a stored token
    pub fn restored(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            username: None,
        }
    }

    /// Start a session after a successful login
    pub fn begin(&mut self, token: impl Into<String>, username: impl Into<String>) {
        self.token = Some(token.into());
        self.username = Some(username.into());
    }

    /// Drop token and username
    pub fn clear(&mut self) {
        self.token = None;
        self.username = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Check if a token is held
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
