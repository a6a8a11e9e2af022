use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::password::generate_token;

/// Maps opaque session tokens to user ids.
///
/// Entries expire `ttl` after login and can be dropped early by logout.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, i32>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Opens a session for `user_id` and returns its token.
    pub async fn issue(&self, user_id: i32) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), user_id).await;
        debug!("Opened session for user {}", user_id);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<i32> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}
