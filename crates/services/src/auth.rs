//! Admin sessions.
//!
//! Credentials come from configuration as sha256 digests; a successful
//! login mints a random bearer token whose digest keys an in-memory
//! session table. Tokens themselves are never stored.

use chrono::{DateTime, Duration, Utc};
use config::AuthConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub email: String,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid or revoked session")]
    Unauthorized,
}

struct SessionRecord {
    email: String,
    expires_at: DateTime<Utc>,
}

pub struct AuthService {
    config: AuthConfig,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_ascii_lowercase();
        let password_digest = sha256_hex(password);
        let known = self.config.admins.iter().any(|admin| {
            admin.email.eq_ignore_ascii_case(&email)
                && admin.password_sha256.eq_ignore_ascii_case(&password_digest)
        });
        if !known {
            warn!(email = %email, "rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::seconds(self.config.session_ttl_secs as i64);
        self.sessions.write().await.insert(
            sha256_hex(&token),
            SessionRecord {
                email: email.clone(),
                expires_at,
            },
        );
        info!(email = %email, "admin logged in");
        Ok(Session {
            token,
            email,
            expires_at,
        })
    }

    pub async fn validate(&self, token: &str) -> Result<AdminIdentity, AuthError> {
        let key = sha256_hex(token);
        let mut sessions = self.sessions.write().await;
        match sessions.get(&key) {
            Some(record) if record.expires_at > Utc::now() => Ok(AdminIdentity {
                email: record.email.clone(),
            }),
            Some(_) => {
                sessions.remove(&key);
                Err(AuthError::SessionExpired)
            }
            None => Err(AuthError::Unauthorized),
        }
    }

    /// Revoke a session. Revoking an already-revoked token is a no-op.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .await
            .remove(&sha256_hex(token))
            .is_some();
        if removed {
            debug!("session revoked");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::AdminCredential;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            admins: vec![AdminCredential {
                email: "admin@foodbnb.dev".to_string(),
                password_sha256: sha256_hex("hunter2"),
            }],
            session_ttl_secs: 3600,
        })
    }

    #[tokio::test]
    async fn login_with_valid_credentials_mints_a_session() {
        let auth = service();
        let session = auth.login("Admin@Foodbnb.dev", "hunter2").await.unwrap();
        assert_eq!(session.email, "admin@foodbnb.dev");
        let identity = auth.validate(&session.token).await.unwrap();
        assert_eq!(identity.email, "admin@foodbnb.dev");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.login("admin@foodbnb.dev", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let auth = service();
        assert!(matches!(
            auth.validate("not-a-token").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn expired_session_is_removed_on_validate() {
        let auth = AuthService::new(AuthConfig {
            admins: vec![AdminCredential {
                email: "admin@foodbnb.dev".to_string(),
                password_sha256: sha256_hex("hunter2"),
            }],
            session_ttl_secs: 0,
        });
        let session = auth.login("admin@foodbnb.dev", "hunter2").await.unwrap();
        assert!(matches!(
            auth.validate(&session.token).await,
            Err(AuthError::SessionExpired)
        ));
        // A second check sees the removed session as plain unauthorized.
        assert!(matches!(
            auth.validate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let auth = service();
        let session = auth.login("admin@foodbnb.dev", "hunter2").await.unwrap();
        assert!(auth.logout(&session.token).await);
        assert!(!auth.logout(&session.token).await);
        assert!(matches!(
            auth.validate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
    }
}
