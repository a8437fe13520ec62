use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tessera_api::{
    app,
    gateway::{HttpGateway, HttpGatewayConfig},
    state::{AppState, AuthConfig},
};
use tessera_core::{AdminBootstrap, RegistrationService};
use tessera_store::{
    app_config::{Config, GatewayMode},
    DbClient, InMemoryStore, PgEventRepository, PgReservationRepository, PgUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tessera - event registration service
#[derive(Parser)]
#[command(name = "tessera-api")]
#[command(version)]
struct Cli {
    /// Port for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default)
    Serve,
    /// Create an administrator account unless the email is taken
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TESSERA__ADMIN__PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera_api=debug,tessera_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;
    let service = Arc::new(build_service(&config).await?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, service, cli.port).await,
        Commands::CreateAdmin { email, password } => {
            match service.ensure_admin(&email, &password).await? {
                AdminBootstrap::Created => println!("Admin account created."),
                AdminBootstrap::AlreadyExists => println!("An account with this email already exists."),
            }
            Ok(())
        }
    }
}

/// Wires the service to Postgres, or to the in-memory store without a database URL.
async fn build_service(config: &Config) -> Result<RegistrationService> {
    match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;

            Ok(RegistrationService::new(
                Arc::new(PgUserRepository::new(db.pool.clone())),
                Arc::new(PgEventRepository::new(db.pool.clone())),
                Arc::new(PgReservationRepository::new(db.pool.clone())),
            ))
        }
        None => {
            tracing::warn!("No database.url configured; using the in-memory store (data is lost on exit)");
            let store = Arc::new(InMemoryStore::new());
            Ok(RegistrationService::new(store.clone(), store.clone(), store))
        }
    }
}

async fn serve(config: Config, service: Arc<RegistrationService>, port: Option<u16>) -> Result<()> {
    // Admin bootstrap
    if let Some((email, password)) = config.admin.credentials() {
        service
            .ensure_admin(email, password)
            .await
            .context("Failed to bootstrap the admin account")?;
    }

    let auth = AuthConfig {
        secret: config.auth.session_secret.clone(),
        session_seconds: config.auth.session_seconds,
        remember_seconds: config.auth.remember_seconds,
        secure_cookies: config.auth.secure_cookies,
    };
    let mut app_state = AppState::local(service, auth, config.api.token.clone());

    if config.gateway.mode == GatewayMode::Http {
        tracing::info!("Pages reach reservations through {}", config.gateway.base_url);
        let gateway = HttpGateway::new(HttpGatewayConfig {
            base_url: config.gateway.base_url.clone(),
            api_token: config.api.token.clone(),
            timeout: Duration::from_secs(config.gateway.timeout_seconds),
        })
        .context("Failed to build the HTTP gateway")?;
        app_state = app_state.with_gateway(Arc::new(gateway));
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port))
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Starting Tessera on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
