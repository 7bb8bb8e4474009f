use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use tokio::sync::Semaphore;

use crate::domain::credential::errors::HashingError;
use crate::domain::credential::ports::PasswordHashing;

/// Argon2id password hashing off the async runtime.
///
/// Hashing is deliberately slow and CPU-bound, so every hash or compare runs
/// on the blocking pool and at most `max_concurrency` of them run at once.
/// Callers over the limit wait for a permit.
pub struct Argon2CredentialHasher {
    hasher: Arc<PasswordHasher>,
    permits: Arc<Semaphore>,
}

impl Argon2CredentialHasher {
    /// Create a new hasher adapter.
    ///
    /// # Arguments
    /// * `hasher` - Configured Argon2 hasher
    /// * `max_concurrency` - Upper bound on simultaneous hash operations (at least 1)
    pub fn new(hasher: PasswordHasher, max_concurrency: usize) -> Self {
        Self {
            hasher: Arc::new(hasher),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    async fn run<T, F>(&self, job: F) -> Result<T, HashingError>
    where
        T: Send + 'static,
        F: FnOnce(&PasswordHasher) -> Result<T, PasswordError> + Send + 'static,
    {
        // Owned so the permit lives as long as the blocking job, not the caller
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| HashingError::Failed(e.to_string()))?;

        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(&hasher)
        })
        .await
        .map_err(|e| HashingError::Failed(format!("Hashing task failed: {}", e)))?
        .map_err(HashingError::from)
    }
}

#[async_trait]
impl PasswordHashing for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<String, HashingError> {
        let password = password.to_string();
        self.run(move |hasher| hasher.hash(&password)).await
    }

    async fn compare(&self, password: &str, digest: &str) -> Result<(), HashingError> {
        let password = password.to_string();
        let digest = digest.to_string();
        self.run(move |hasher| hasher.verify(&password, &digest))
            .await
    }
}

impl From<PasswordError> for HashingError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => HashingError::Mismatch,
            other => HashingError::Failed(other.to_string()),
        }
    }
}
