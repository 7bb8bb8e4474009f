use std::env;
use std::path::PathBuf;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const DEFAULT_STORAGE_DIRECTORY: &str = ".key-stone";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub tokens: TokenConfig,
    pub storage: StorageConfig,
    pub hashing: HashingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing configuration.
///
/// `public_key` signs access tokens, `private_key` signs refresh tokens.
/// Both are HMAC secrets, not asymmetric keys.
#[derive(Deserialize, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub public_key: String,
    pub private_key: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("public_key", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory for the file backend: the configured path, or `~/.key-stone`.
    ///
    /// # Errors
    /// * `Message` - No path configured and no home directory to fall back on
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        self.resolve_path(dirs::home_dir())
    }

    fn resolve_path(&self, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => home
                .map(|home| home.join(DEFAULT_STORAGE_DIRECTORY))
                .ok_or_else(|| {
                    ConfigError::Message(
                        "storage.path is not set and no home directory was found".into(),
                    )
                }),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HashingConfig {
    pub max_concurrency: usize,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (KS_TOKENS__PUBLIC_KEY, KS_SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults (everything except the two token secrets)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080)?
            .set_default("tokens.issuer", "key-stone")?
            .set_default("storage.backend", "file")?
            .set_default("hashing.max_concurrency", 4)?
            .set_default("hashing.memory_kib", 19 * 1024)?
            .set_default("hashing.iterations", 2)?
            .set_default("hashing.parallelism", 1)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: KS_TOKENS__PUBLIC_KEY=... overrides tokens.public_key
            .add_source(
                Environment::with_prefix("KS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.issuer.is_empty() {
            return Err(ConfigError::Message("tokens.issuer must not be empty".into()));
        }
        if self.tokens.public_key.is_empty() || self.tokens.private_key.is_empty() {
            return Err(ConfigError::Message(
                "tokens.public_key and tokens.private_key are required".into(),
            ));
        }
        if self.tokens.public_key == self.tokens.private_key {
            return Err(ConfigError::Message(
                "tokens.public_key and tokens.private_key must differ".into(),
            ));
        }
        if self.hashing.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "hashing.max_concurrency must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
