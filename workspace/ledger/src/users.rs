use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{CreateUserRequest, Role, UpdateRoleRequest, UserDto};
use tracing::{info, instrument, warn};

use crate::convert::{role_to_model, user_dto};
use crate::error::{LedgerError, Result};
use crate::mailer::Mailer;
use crate::password::{generate_token, hash_password};
use crate::store::{NewUser, UserStore};

/// How long a password-set link stays valid.
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Account administration.
#[derive(Clone)]
pub struct UserPolicy {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl UserPolicy {
    pub fn new(users: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, public_base_url: String) -> Self {
        Self {
            users,
            mailer,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates an inactive account and mails its password-set link.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserDto> {
        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Role::Executive,
            Some(raw) => raw.parse::<Role>().map_err(LedgerError::Validation)?,
        };
        let (username, display_id, email) =
            required_identity(&request.username, &request.display_id, &request.email)?;
        self.ensure_email_free(&email).await?;

        let token = generate_token();
        let created = self
            .users
            .insert_user(NewUser {
                username,
                display_id,
                email,
                role: role_to_model(role),
                password_hash: String::new(),
                is_active: false,
                password_set_token: Some(token.clone()),
                token_expiry: Some(Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)),
            })
            .await?;
        info!("Created {} account {}", role, created.id);

        let link = format!("{}/set-password?token={}", self.public_base_url, token);
        self.mailer
            .send_password_link(&created.email, &created.username, &link)
            .await?;
        Ok(user_dto(created))
    }

    /// Creates an active admin with a known password. Used to bootstrap a
    /// fresh installation.
    #[instrument(skip(self, password))]
    pub async fn create_admin(
        &self,
        username: &str,
        display_id: &str,
        email: &str,
        password: &str,
    ) -> Result<UserDto> {
        if password.is_empty() {
            return Err(LedgerError::validation("password is required"));
        }
        let (username, display_id, email) = required_identity(username, display_id, email)?;
        self.ensure_email_free(&email).await?;
        let password_hash = hash_password(password).await?;

        let created = self
            .users
            .insert_user(NewUser {
                username,
                display_id,
                email,
                role: role_to_model(Role::Admin),
                password_hash,
                is_active: true,
                password_set_token: None,
                token_expiry: None,
            })
            .await?;
        info!("Created admin account {}", created.id);
        Ok(user_dto(created))
    }

    pub async fn list(&self) -> Result<Vec<UserDto>> {
        let users = self.users.list_users().await?;
        Ok(users.into_iter().map(user_dto).collect())
    }

    pub async fn get(&self, id: i32) -> Result<UserDto> {
        self.users
            .get_user(id)
            .await?
            .map(user_dto)
            .ok_or_else(|| LedgerError::not_found("User", id))
    }

    #[instrument(skip(self))]
    pub async fn update_role(&self, request: UpdateRoleRequest) -> Result<UserDto> {
        let role: Role = request.role.parse().map_err(LedgerError::Validation)?;
        let updated = self
            .users
            .set_user_role(request.user_id, role_to_model(role))
            .await?
            .ok_or_else(|| LedgerError::not_found("User", request.user_id))?;
        info!("User {} is now {}", updated.id, role);
        Ok(user_dto(updated))
    }

    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        if self.users.user_by_email(email).await?.is_some() {
            warn!("Email already registered");
            return Err(LedgerError::Conflict(format!(
                "a user with email '{}' already exists",
                email
            )));
        }
        Ok(())
    }
}

/// Trims the identity fields and lower-cases the email.
fn required_identity(username: &str, display_id: &str, email: &str) -> Result<(String, String, String)> {
    let username = username.trim();
    let display_id = display_id.trim();
    let email = email.trim().to_lowercase();
    if username.is_empty() || display_id.is_empty() || email.is_empty() {
        return Err(LedgerError::validation(
            "username, display id and email are required",
        ));
    }
    Ok((username.to_string(), display_id.to_string(), email))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::store::memory::MemoryStore;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_password_link(&self, email: &str, _username: &str, link: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), link.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        users: UserPolicy,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let users = UserPolicy::new(
            store.clone(),
            mailer.clone(),
            "http://localhost:8080/".to_string(),
        );
        Fixture { store, mailer, users }
    }

    fn request(email: &str, role: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            username: " Kiran ".to_string(),
            display_id: "EMP-42".to_string(),
            email: email.to_string(),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_user_sends_link() {
        let f = fixture();
        let user = f.users.create(request("Kiran@Example.com", None)).await.unwrap();

        assert_eq!(user.username, "Kiran");
        assert_eq!(user.email, "kiran@example.com");
        assert_eq!(user.role, Role::Executive);
        assert!(!user.is_active);

        let stored = f.store.get_user(user.id).await.unwrap().unwrap();
        let token = stored.password_set_token.unwrap();
        assert!(stored.token_expiry.unwrap() > Utc::now() + Duration::hours(23));

        let sent = f.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "kiran@example.com");
        assert_eq!(
            sent[0].1,
            format!("http://localhost:8080/set-password?token={}", token)
        );
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let f = fixture();
        let err = f.users.create(request("a@example.com", Some("owner"))).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = f.users.create(request("  ", None)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        f.users.create(request("a@example.com", Some("management"))).await.unwrap();
        let err = f.users.create(request("A@example.com", None)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_role() {
        let f = fixture();
        let user = f.users.create(request("a@example.com", None)).await.unwrap();

        let updated = f
            .users
            .update_role(UpdateRoleRequest { user_id: user.id, role: "admin".into() })
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);

        let err = f
            .users
            .update_role(UpdateRoleRequest { user_id: user.id, role: "ceo".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = f
            .users
            .update_role(UpdateRoleRequest { user_id: 999, role: "admin".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_admin_is_active() {
        let f = fixture();
        let admin = f
            .users
            .create_admin("Root", "ADM-1", "root@example.com", "pw")
            .await
            .unwrap();
        assert!(admin.is_active);
        assert_eq!(admin.role, Role::Admin);
        assert!(f.mailer.sent.lock().unwrap().is_empty());

        let listed = f.users.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(f.users.get(admin.id).await.unwrap(), admin);
    }
}
