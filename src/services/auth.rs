use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::{User, UserRepository};
use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::AppState;

pub const ROLE_ADMIN: &str = "admin";
/// Role given to stored users whose record does not name one.
pub const ROLE_AGENT: &str = "agent";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated account as echoed to clients. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_ADMIN)
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        SessionUser {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: match user.role.trim() {
                "" => ROLE_AGENT.to_string(),
                role => role.to_string(),
            },
            name: user.name.clone(),
        }
    }
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        SessionUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            name: claims.name,
        }
    }
}

pub struct AuthService;

impl AuthService {
    /// Check credentials against stored users, then against the configured
    /// bootstrap admin. Returns a signed token and the session user.
    ///
    /// `lang` selects the language of the rejection message.
    pub async fn login(
        state: &Arc<AppState>,
        email: &str,
        password: &str,
        lang: Option<&str>,
    ) -> AppResult<(String, SessionUser)> {
        let rejected =
            || AppError::InvalidCredentials(i18n::tr(lang, "auth.invalid_credentials", None));

        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(rejected());
        }

        let session = match UserRepository::find_by_email(&state.store, email).await {
            Some(user) if Self::verify_password(password, &user.password) => {
                SessionUser::from(&user)
            }
            _ if Self::matches_bootstrap_admin(state, email, password) => {
                let admin = &state.config.admin;
                SessionUser {
                    id: "admin".to_string(),
                    email: admin.email.clone(),
                    role: ROLE_ADMIN.to_string(),
                    name: admin.name.clone(),
                }
            }
            _ => {
                tracing::info!("Rejected login attempt");
                return Err(rejected());
            }
        };

        let token = Self::create_jwt(state, &session)?;
        tracing::info!("User {} logged in", session.id);
        Ok((token, session))
    }

    /// bcrypt for hashed values (`$2a$`, `$2b$`, `$2y$`), plain equality otherwise.
    pub fn verify_password(password: &str, stored: &str) -> bool {
        if stored.is_empty() {
            return false;
        }
        if stored.starts_with("$2") {
            return bcrypt::verify(password, stored).unwrap_or_else(|e| {
                tracing::warn!("Stored password hash could not be verified: {}", e);
                false
            });
        }
        stored == password
    }

    fn matches_bootstrap_admin(state: &Arc<AppState>, email: &str, password: &str) -> bool {
        let admin = &state.config.admin;
        !admin.email.is_empty()
            && !admin.password.is_empty()
            && admin.email.eq_ignore_ascii_case(email)
            && admin.password == password
    }

    /// Create a signed JWT for a session user
    pub fn create_jwt(state: &Arc<AppState>, user: &SessionUser) -> AppResult<String> {
        let secret = Self::secret(state)?;
        let now = Utc::now();
        let exp = now + Duration::hours(state.config.jwt.expiration_hours);
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Decode and validate a JWT, returning the claims
    pub fn decode_jwt(state: &Arc<AppState>, token: &str) -> AppResult<Claims> {
        let secret = Self::secret(state)?;
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn secret(state: &Arc<AppState>) -> AppResult<&str> {
        let secret = state.config.jwt.secret.as_str();
        if secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET is empty".to_string()));
        }
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::test_state;

    #[test]
    fn plaintext_and_bcrypt_passwords_verify() {
        assert!(AuthService::verify_password("secret", "secret"));
        assert!(!AuthService::verify_password("secret", "other"));
        assert!(!AuthService::verify_password("", ""));

        let hash = bcrypt::hash("secret", 4).unwrap();
        assert!(AuthService::verify_password("secret", &hash));
        assert!(!AuthService::verify_password("nope", &hash));
    }

    #[tokio::test]
    async fn stored_user_logs_in_and_token_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .store
            .upsert(User {
                id: 7,
                email: "Agent@Example.com".to_string(),
                password: "pw".to_string(),
                role: "agent".to_string(),
                name: "Agent".to_string(),
            })
            .await
            .unwrap();

        let (token, user) = AuthService::login(&state, "agent@example.com", "pw", None)
            .await
            .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, "agent");
        assert!(!user.is_admin());

        let claims = AuthService::decode_jwt(&state, &token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "Agent@Example.com");
    }

    #[tokio::test]
    async fn bootstrap_admin_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let email = state.config.admin.email.clone();
        let password = state.config.admin.password.clone();

        let (_, user) = AuthService::login(&state, &email, &password, None).await.unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let email = state.config.admin.email.clone();

        let err = AuthService::login(&state, &email, "wrong", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials(ref msg) if msg == "Invalid email or password"));

        let err = AuthService::login(&state, &email, "wrong", Some("ru"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials(ref msg) if msg == "Неверный email или пароль"));
    }

    #[tokio::test]
    async fn stored_user_without_role_is_not_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .store
            .upsert(User {
                id: 8,
                email: "norole@example.com".to_string(),
                password: "pw".to_string(),
                role: "  ".to_string(),
                name: "No Role".to_string(),
            })
            .await
            .unwrap();

        let (_, user) = AuthService::login(&state, "norole@example.com", "pw", None)
            .await
            .unwrap();
        assert_eq!(user.role, ROLE_AGENT);
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let user = SessionUser {
            id: "1".to_string(),
            email: "a@b.c".to_string(),
            role: ROLE_ADMIN.to_string(),
            name: "A".to_string(),
        };
        let mut token = AuthService::create_jwt(&state, &user).unwrap();
        token.push('x');
        assert!(matches!(
            AuthService::decode_jwt(&state, &token),
            Err(AppError::Jwt(_))
        ));
    }
}
