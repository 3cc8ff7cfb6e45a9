use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::users::User, repositories::user_repo::UserRepository, Error, Result};

/// Identity provider: registration, login and per-request token resolution.
/// The lifecycle services never see tokens, only the resolved user id.
#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    jwt_expiration: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        jwt_expiration: i64,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expiration,
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(Error::Validation("Email already exists".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| Error::InternalServerError)?
            .to_string();

        self.user_repo.create_user(name, email, &password_hash).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(Error::Unauthenticated)?;

        let argon2 = Argon2::default();
        let parsed_hash =
            PasswordHash::new(&user.password).map_err(|_| Error::InternalServerError)?;
        argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| Error::Unauthenticated)?;

        self.generate_token(user.id)
    }

    pub async fn resolve_user(&self, user_id: Uuid) -> Result<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(Error::Unauthenticated)
    }

    fn generate_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.jwt_expiration)).timestamp() as usize;
        let iat = now.timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| Error::InternalServerError)
    }

    pub fn decode_token<T: Into<String>>(&self, token: T) -> Result<Uuid> {
        let decoded = decode::<Claims>(
            &token.into(),
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| Error::Unauthenticated)?;

        Uuid::parse_str(&decoded.claims.sub).map_err(|_| Error::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for MemoryUsers {
        async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
            let user = User {
                id: Uuid::now_v7(),
                name: name.to_string(),
                email: email.to_string(),
                password: password_hash.to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == user_id)
                .cloned())
        }
    }

    fn auth_service() -> AuthService {
        AuthService::new(Arc::new(MemoryUsers::default()), "test-secret".to_string(), 60)
    }

    #[tokio::test]
    async fn register_then_login_round_trips_the_user_id() {
        let svc = auth_service();

        let user = svc
            .register("Jane", "jane@example.com", "secret123")
            .await
            .unwrap();

        let token = svc.login("jane@example.com", "secret123").await.unwrap();
        assert_eq!(svc.decode_token(token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthenticated() {
        let svc = auth_service();
        svc.register("Jane", "jane@example.com", "secret123")
            .await
            .unwrap();

        let err = svc.login("jane@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = auth_service();
        svc.register("Jane", "jane@example.com", "secret123")
            .await
            .unwrap();

        let err = svc
            .register("Other Jane", "jane@example.com", "secret456")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let svc = auth_service();
        assert!(matches!(
            svc.decode_token("not-a-jwt"),
            Err(Error::Unauthenticated)
        ));
    }
}
