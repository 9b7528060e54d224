//! Registration and login orchestration

use std::sync::Arc;

use chrono::Utc;
use tokio::task;
use tracing::{info, warn};

use crate::domain::auth::AuthError;
use crate::domain::user::{validate_credentials, Membership, NewUser, User, UserRepository};

use super::jwt::JwtService;
use super::password::PasswordHasher;

/// Coordinates the user store, the password hasher and the token issuer
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<JwtService>,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Create an account with default membership attributes
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        validate_credentials(email, password).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if self
            .repository
            .email_exists(email)
            .await
            .map_err(AuthError::StoreFailure)?
        {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;

        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
            membership: Membership::new_member(Utc::now()),
        };

        // The store re-checks uniqueness; losing a race surfaces as a conflict.
        let user = self.repository.create(new_user).await.map_err(|e| {
            if e.is_conflict() {
                AuthError::DuplicateEmail
            } else {
                AuthError::StoreFailure(e)
            }
        })?;

        info!(user_id = %user.id(), member_code = %user.membership().member_code, "User registered");

        Ok(user)
    }

    /// Check credentials and mint a session token
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .repository
            .get_by_email(email)
            .await
            .map_err(AuthError::StoreFailure)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, user.password_hash()).await? {
            warn!(user_id = %user.id(), "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id(), user.email())
            .map_err(|e| AuthError::TokenCreationFailure(Box::new(e)))?;

        info!(user_id = %user.id(), "User logged in");

        Ok(token)
    }

    // Hashing is CPU-bound and runs on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, UserId};
    use crate::domain::DomainError;
    use crate::infrastructure::auth::jwt::{JwtConfig, DEFAULT_TOKEN_TTL_HOURS};
    use crate::infrastructure::auth::password::Argon2Hasher;
    use crate::infrastructure::auth::verifier::SessionVerifier;
    use crate::infrastructure::user::InMemoryUserRepository;

    const SECRET: &str = "test-secret-key-12345";

    fn tokens(secret: &str) -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig::new(secret, DEFAULT_TOKEN_TTL_HOURS)))
    }

    fn create_service(repository: Arc<dyn UserRepository>) -> AuthService {
        AuthService::new(repository, Arc::new(Argon2Hasher::new()), tokens(SECRET))
    }

    #[derive(Debug)]
    struct FailingHasher;

    impl PasswordHasher for FailingHasher {
        fn hash(&self, _password: &str) -> Result<String, AuthError> {
            Err(AuthError::HashingFailure("entropy source unavailable".into()))
        }

        fn verify(&self, _password: &str, _hash: &str) -> bool {
            false
        }
    }

    #[derive(Debug)]
    struct PanickingHasher;

    impl PasswordHasher for PanickingHasher {
        fn hash(&self, _password: &str) -> Result<String, AuthError> {
            panic!("hasher crashed")
        }

        fn verify(&self, _password: &str, _hash: &str) -> bool {
            panic!("hasher crashed")
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = create_service(repo.clone());

        let registered = service.register("a@x.com", "pw123").await.unwrap();
        assert_eq!(registered.id(), UserId::new(1));
        assert_eq!(registered.email(), "a@x.com");
        assert_eq!(registered.membership().level, "Basic");
        assert_eq!(registered.membership().points, 0);
        assert!(registered.membership().member_code.starts_with("LBK"));
        assert_ne!(registered.password_hash(), "pw123");

        let token = service.login("a@x.com", "pw123").await.unwrap();

        let verifier = SessionVerifier::new(tokens(SECRET), repo);
        let user = verifier
            .verify(Some(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(user.id(), UserId::new(1));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let service = create_service(Arc::new(InMemoryUserRepository::new()));

        assert!(matches!(
            service.register("", "pw123").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            service.register("a@x.com", "").await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = create_service(repo.clone());

        service.register("a@x.com", "pw123").await.unwrap();
        let result = service.register("a@x.com", "other").await;

        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_store_failure_on_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists()
            .returning(|_| Err(DomainError::storage("connection refused")));
        repo.expect_create().never();

        let service = create_service(Arc::new(repo));

        let result = service.register("a@x.com", "pw123").await;
        assert!(matches!(result, Err(AuthError::StoreFailure(_))));
    }

    #[tokio::test]
    async fn test_register_lost_race_is_duplicate() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create()
            .returning(|_| Err(DomainError::conflict("Email 'a@x.com' already exists")));

        let service = create_service(Arc::new(repo));

        let result = service.register("a@x.com", "pw123").await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_persist_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create()
            .returning(|_| Err(DomainError::storage("disk full")));

        let service = create_service(Arc::new(repo));

        let result = service.register("a@x.com", "pw123").await;
        assert!(matches!(result, Err(AuthError::StoreFailure(_))));
    }

    #[tokio::test]
    async fn test_register_hashing_failure_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create().never();

        let service = AuthService::new(Arc::new(repo), Arc::new(FailingHasher), tokens(SECRET));

        let err = service.register("a@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::HashingFailure(_)));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_the_same() {
        let service = create_service(Arc::new(InMemoryUserRepository::new()));
        service.register("a@x.com", "pw123").await.unwrap();

        let wrong_password = service.login("a@x.com", "wrong").await.unwrap_err();
        let unknown_email = service.login("nobody@x.com", "pw123").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.code(), unknown_email.code());
    }

    #[tokio::test]
    async fn test_login_store_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(DomainError::storage("connection refused")));

        let service = create_service(Arc::new(repo));

        let result = service.login("a@x.com", "pw123").await;
        assert!(matches!(result, Err(AuthError::StoreFailure(_))));
    }

    #[tokio::test]
    async fn test_login_token_creation_failure() {
        let repo = Arc::new(InMemoryUserRepository::new());
        create_service(repo.clone())
            .register("a@x.com", "pw123")
            .await
            .unwrap();

        let service = AuthService::new(repo, Arc::new(Argon2Hasher::new()), tokens(""));

        let result = service.login("a@x.com", "pw123").await;
        assert!(matches!(result, Err(AuthError::TokenCreationFailure(_))));
    }

    #[tokio::test]
    async fn test_crashed_hashing_task_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create().never();

        let service = AuthService::new(Arc::new(repo), Arc::new(PanickingHasher), tokens(SECRET));

        let err = service.register("a@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::HashingFailure(_)));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_crashed_verification_task_is_not_a_credential_error() {
        let repo = Arc::new(InMemoryUserRepository::new());
        create_service(repo.clone())
            .register("a@x.com", "pw123")
            .await
            .unwrap();

        let service = AuthService::new(repo, Arc::new(PanickingHasher), tokens(SECRET));

        let err = service.login("a@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::HashingFailure(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_logins() {
        let service = Arc::new(create_service(Arc::new(InMemoryUserRepository::new())));
        for i in 0..4 {
            service
                .register(&format!("user{}@x.com", i), "pw123")
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.login(&format!("user{}@x.com", i), "pw123").await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
