use std::sync::Arc;

use auth::Authenticator;
use ordering_api::config::Config;
use ordering_api::domain::credentials::service::LoginService;
use ordering_api::inbound::http::router::create_router;
use ordering_api::outbound::InMemoryUserDirectory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordering_api=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "ordering-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        issuer = %config.jwt.issuer,
        audience = %config.jwt.audience,
        users = config.users.len(),
        "Configuration loaded"
    );

    // Refuse to start without usable token settings
    let authenticator = Arc::new(Authenticator::from_settings(config.jwt)?);
    let directory = Arc::new(InMemoryUserDirectory::new(config.users)?);
    if directory.is_empty() {
        tracing::warn!("No user accounts configured, every login will be rejected");
    }

    let login_service = Arc::new(LoginService::new(directory, Arc::clone(&authenticator)));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(login_service, authenticator);
    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
