use std::sync::Arc;

use auth::JwtHandler;
use auth::PasswordHasher;
use identity_service::config::Config;
use identity_service::config::StorageBackend;
use identity_service::credential::ports::AuthFlowPort;
use identity_service::credential::ports::CredentialRepository;
use identity_service::credential::service::AuthFlow;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::clock::SystemClock;
use identity_service::outbound::security::Argon2CredentialHasher;
use identity_service::repositories::FileCredentialRepository;
use identity_service::repositories::InMemoryCredentialRepository;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        issuer = %config.tokens.issuer,
        storage_backend = ?config.storage.backend,
        hashing_concurrency = config.hashing.max_concurrency,
        "Configuration loaded"
    );

    let auth_flow: Arc<dyn AuthFlowPort> = match config.storage.backend {
        StorageBackend::File => {
            let repository = FileCredentialRepository::new(config.storage.resolved_path()?)?;
            tracing::info!(
                path = %repository.path().display(),
                storage = "file",
                "Credential repository opened"
            );
            build_auth_flow(&config, repository)?
        }
        StorageBackend::Memory => {
            tracing::warn!(
                storage = "memory",
                "Credentials are kept in memory and lost on restart"
            );
            build_auth_flow(&config, InMemoryCredentialRepository::new())?
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_flow))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

fn build_auth_flow<CR>(
    config: &Config,
    repository: CR,
) -> Result<Arc<dyn AuthFlowPort>, anyhow::Error>
where
    CR: CredentialRepository,
{
    let password_hasher = PasswordHasher::with_params(
        config.hashing.memory_kib,
        config.hashing.iterations,
        config.hashing.parallelism,
    )?;
    let hasher = Argon2CredentialHasher::new(password_hasher, config.hashing.max_concurrency);

    let access_codec = JwtHandler::new(&config.tokens.issuer, config.tokens.public_key.as_bytes());
    let refresh_codec =
        JwtHandler::new(&config.tokens.issuer, config.tokens.private_key.as_bytes());

    Ok(Arc::new(AuthFlow::new(
        Arc::new(repository),
        Arc::new(hasher),
        Arc::new(access_codec),
        Arc::new(refresh_codec),
        Arc::new(SystemClock),
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
