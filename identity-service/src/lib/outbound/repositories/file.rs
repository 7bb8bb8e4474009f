use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::Username;
use crate::domain::credential::ports::CredentialRepository;

#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

const STAGING_SUFFIX: &str = ".tmp";

/// Credential store with one file per username.
///
/// Each file holds the password digest and nothing else. A new credential is
/// written to a hidden staging file first and then hard-linked to its final
/// name: the link is the exclusive create (it fails if the name exists) and
/// readers never see a partially written digest. The whole sequence runs as a
/// single blocking job, so it completes even if the caller goes away.
#[derive(Debug, Clone)]
pub struct FileCredentialRepository {
    root: PathBuf,
}

impl FileCredentialRepository {
    /// Open (and create if needed) the credential directory, removing staging
    /// files left by an earlier process.
    ///
    /// # Arguments
    /// * `path` - Directory holding the credential files
    ///
    /// # Errors
    /// * `Storage` - Directory could not be created or listed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let root = path.into();

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIRECTORY_MODE);
        }
        builder.create(&root).map_err(|e| {
            CredentialError::Storage(format!(
                "Failed to create directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let swept = sweep_staging_files(&root).map_err(|e| {
            CredentialError::Storage(format!(
                "Failed to list directory {}: {}",
                root.display(),
                e
            ))
        })?;
        if swept > 0 {
            tracing::info!(count = swept, "Removed leftover staging files");
        }

        tracing::debug!(path = %root.display(), "Credential directory ready");

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn credential_path(&self, username: &Username) -> PathBuf {
        self.root.join(username.as_str())
    }

    // Usernames cannot contain dots, so staging names never collide with them
    fn staging_path(&self, username: &Username) -> PathBuf {
        self.root.join(format!(
            ".{}.{}{}",
            username,
            Uuid::new_v4().simple(),
            STAGING_SUFFIX
        ))
    }
}

fn is_staging_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(STAGING_SUFFIX)
}

fn sweep_staging_files(root: &Path) -> io::Result<usize> {
    let mut swept = 0;

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_name().to_str().is_some_and(is_staging_name) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => swept += 1,
            Err(e) => tracing::warn!(
                path = %entry.path().display(),
                error = %e,
                "Failed to remove staging file"
            ),
        }
    }

    Ok(swept)
}

fn write_staging(path: &Path, digest: &str) -> io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(digest.as_bytes())?;
    file.sync_all()
}

fn remove_staging(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove staging file"
        ),
    }
}

/// Stage, link and unstage. The staging file is removed on every path.
fn link_credential(staging: &Path, target: &Path, digest: &str) -> io::Result<()> {
    let linked = write_staging(staging, digest)
        .and_then(|_| std::fs::hard_link(staging, target));
    remove_staging(staging);
    linked
}

#[async_trait]
impl CredentialRepository for FileCredentialRepository {
    async fn create(&self, credential: Credential) -> Result<(), CredentialError> {
        let target = self.credential_path(&credential.username);
        let staging = self.staging_path(&credential.username);
        let digest = credential.password_digest;

        let linked =
            tokio::task::spawn_blocking(move || link_credential(&staging, &target, &digest))
                .await
                .map_err(|e| {
                    CredentialError::Storage(format!("Credential write task failed: {}", e))
                })?;

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(
                CredentialError::AlreadyExists(credential.username.to_string()),
            ),
            Err(e) => Err(CredentialError::Storage(format!(
                "Failed to create credential: {}",
                e
            ))),
        }
    }

    async fn get(&self, username: &Username) -> Result<Credential, CredentialError> {
        match fs::read_to_string(self.credential_path(username)).await {
            Ok(digest) => Ok(Credential::new(username.clone(), digest)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CredentialError::NotFound(username.to_string()))
            }
            Err(e) => Err(CredentialError::Storage(format!(
                "Failed to read credential: {}",
                e
            ))),
        }
    }

    async fn delete(&self, credential: &Credential) -> Result<(), CredentialError> {
        match fs::remove_file(self.credential_path(&credential.username)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CredentialError::NotFound(
                credential.username.to_string(),
            )),
            Err(e) => Err(CredentialError::Storage(format!(
                "Failed to delete credential: {}",
                e
            ))),
        }
    }
}
