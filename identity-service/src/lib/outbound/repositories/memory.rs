use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::Username;
use crate::domain::credential::ports::CredentialRepository;

/// Credential store held in process memory.
///
/// `create` and `delete` hold the write lock across the whole
/// check-then-mutate sequence; reads share the read lock.
#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<HashMap<Username, Credential>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn create(&self, credential: Credential) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write().await;

        match credentials.entry(credential.username.clone()) {
            Entry::Occupied(entry) => {
                Err(CredentialError::AlreadyExists(entry.key().to_string()))
            }
            Entry::Vacant(entry) => {
                entry.insert(credential);
                Ok(())
            }
        }
    }

    async fn get(&self, username: &Username) -> Result<Credential, CredentialError> {
        self.credentials
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound(username.to_string()))
    }

    async fn delete(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.credentials
            .write()
            .await
            .remove(&credential.username)
            .map(|_| ())
            .ok_or_else(|| CredentialError::NotFound(credential.username.to_string()))
    }
}
