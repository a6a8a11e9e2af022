use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

/// Delivers account e-mails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the one-time link a new user follows to choose a password.
    async fn send_password_link(&self, email: &str, username: &str, link: &str) -> Result<()>;
}

/// Writes mails to the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_link(&self, email: &str, username: &str, link: &str) -> Result<()> {
        info!(%email, %username, %link, "Password set link issued");
        Ok(())
    }
}
