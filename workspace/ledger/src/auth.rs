use std::sync::Arc;

use chrono::Utc;
use common::{LoginRequest, LoginResponse, Role, SetPasswordRequest, UserDto};
use tracing::{debug, info, instrument, warn};

use crate::convert::user_dto;
use crate::error::{LedgerError, Result};
use crate::password::{hash_password, verify_password};
use crate::session::SessionStore;
use crate::store::UserStore;

/// The authenticated user an operation runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

impl From<&UserDto> for Actor {
    fn from(user: &UserDto) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Credentials, sessions and password activation.
#[derive(Clone)]
pub struct AuthPolicy {
    users: Arc<dyn UserStore>,
    sessions: SessionStore,
}

impl AuthPolicy {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionStore) -> Self {
        Self { users, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let email = request.email.trim().to_lowercase();
        let Some(user) = self.users.user_by_email(&email).await? else {
            warn!("Login for unknown email");
            return Err(LedgerError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };
        if !verify_password(&request.password, &user.password_hash).await {
            warn!("Login with wrong password for user {}", user.id);
            return Err(LedgerError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            warn!("Login for inactive user {}", user.id);
            return Err(LedgerError::Unauthorized(
                "account is not active".to_string(),
            ));
        }

        let token = self.sessions.issue(user.id).await;
        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            user: user_dto(user),
            token,
        })
    }

    /// Ends the session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        self.sessions.revoke(token).await;
    }

    /// Resolves a session token to its user.
    ///
    /// The user row is re-read on every call so that deactivation and role
    /// changes apply to open sessions straight away.
    pub async fn authenticate(&self, token: &str) -> Result<Option<UserDto>> {
        let Some(user_id) = self.sessions.resolve(token).await else {
            return Ok(None);
        };
        match self.users.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(Some(user_dto(user))),
            _ => {
                debug!("Session of user {} no longer valid", user_id);
                self.sessions.revoke(token).await;
                Ok(None)
            }
        }
    }

    /// Redeems a password-set token and activates the account.
    #[instrument(skip(self, request))]
    pub async fn set_password(&self, request: SetPasswordRequest) -> Result<UserDto> {
        if request.password.is_empty() {
            return Err(LedgerError::validation("password is required"));
        }
        let token = request.token.trim();
        let user = match token {
            "" => None,
            _ => self.users.user_by_token(token, Utc::now()).await?,
        }
        .ok_or_else(|| LedgerError::validation("invalid or expired token"))?;

        let hash = hash_password(&request.password).await?;
        self.users.activate_user(user.id, &hash).await?;
        info!("User {} set a password and is now active", user.id);

        self.users
            .get_user(user.id)
            .await?
            .map(user_dto)
            .ok_or_else(|| LedgerError::not_found("User", user.id))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::NewUser;
    use crate::store::memory::MemoryStore;
    use model::entities::user::UserRole;

    struct Fixture {
        store: Arc<MemoryStore>,
        auth: AuthPolicy,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthPolicy::new(store.clone(), SessionStore::new(Duration::from_secs(60)));
        Fixture { store, auth }
    }

    async fn add_user(store: &MemoryStore, email: &str, password: Option<&str>, token: Option<&str>) -> i32 {
        store
            .insert_user(NewUser {
                username: "Meera".to_string(),
                display_id: "EMP-1".to_string(),
                email: email.to_string(),
                role: UserRole::Executive,
                password_hash: match password {
                    Some(p) => hash_password(p).await.unwrap(),
                    None => String::new(),
                },
                is_active: password.is_some(),
                password_set_token: token.map(str::to_string),
                token_expiry: token.map(|_| Utc::now() + chrono::Duration::hours(24)),
            })
            .await
            .unwrap()
            .id
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let f = fixture();
        let id = add_user(&f.store, "meera@example.com", Some("pw"), None).await;

        let response = f.auth.login(login("  Meera@Example.com ", "pw")).await.unwrap();
        assert_eq!(response.user.id, id);

        let user = f.auth.authenticate(&response.token).await.unwrap().unwrap();
        assert_eq!(Actor::from(&user), Actor { id, role: Role::Executive });

        f.auth.logout(&response.token).await;
        assert!(f.auth.authenticate(&response.token).await.unwrap().is_none());
        f.auth.logout(&response.token).await;
    }

    #[tokio::test]
    async fn test_login_failures() {
        let f = fixture();
        add_user(&f.store, "meera@example.com", Some("pw"), None).await;
        add_user(&f.store, "new@example.com", None, Some("tok")).await;

        let err = f.auth.login(login("meera@example.com", "nope")).await.unwrap_err();
        assert_eq!(err.to_string(), BAD_CREDENTIALS);
        let err = f.auth.login(login("ghost@example.com", "pw")).await.unwrap_err();
        assert_eq!(err.to_string(), BAD_CREDENTIALS);
        // An account without a password cannot log in at all.
        let err = f.auth.login(login("new@example.com", "")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_set_password_activates_account() {
        let f = fixture();
        let id = add_user(&f.store, "new@example.com", None, Some("tok")).await;

        let err = f
            .auth
            .set_password(SetPasswordRequest { token: "wrong".into(), password: "pw".into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid or expired token");

        let err = f
            .auth
            .set_password(SetPasswordRequest { token: "tok".into(), password: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let user = f
            .auth
            .set_password(SetPasswordRequest { token: "tok".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_active);

        // The token is single use.
        let again = f
            .auth
            .set_password(SetPasswordRequest { token: "tok".into(), password: "pw2".into() })
            .await;
        assert!(again.is_err());

        assert!(f.auth.login(login("new@example.com", "pw")).await.is_ok());
    }

    #[tokio::test]
    async fn test_session_of_deactivated_user_is_dropped() {
        let f = fixture();
        let id = add_user(&f.store, "new@example.com", None, None).await;
        let token = f.auth.sessions().issue(id).await;
        assert!(f.auth.authenticate(&token).await.unwrap().is_none());
        assert_eq!(f.auth.sessions().resolve(&token).await, None);
    }
}
