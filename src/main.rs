use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seatcheck::bootstrap::{bootstrap_first_operator, seed_dev_data};
use seatcheck::config::{Config, SigningKeyMaterial};
use seatcheck::db::{AppState, create_pool, init_audit_db, init_db};
use seatcheck::entitlements::Entitlements;

#[derive(Parser, Debug)]
#[command(name = "seatcheck")]
#[command(about = "License and device entitlement service")]
struct Cli {
    /// Seed the database with dev data (operator, organization, license)
    #[arg(long)]
    seed: bool,

    /// Print a fresh Ed25519 signing key pair and exit
    #[arg(long)]
    generate_key: bool,
}

fn fatal(context: &str, error: impl std::fmt::Display) -> ! {
    tracing::error!("{}: {}", context, error);
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}

fn run_bootstrap(state: &AppState, email: &str) {
    let conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => fatal("Failed to get db connection for bootstrap", e),
    };

    match bootstrap_first_operator(&conn, &state.audit, email) {
        Ok(Some((operator, api_key))) => {
            tracing::info!("============================================");
            tracing::info!("BOOTSTRAP OPERATOR CREATED");
            tracing::info!("Email: {}", operator.email);
            tracing::info!("API Key: {}", api_key);
            tracing::info!("============================================");
            tracing::info!("SAVE THIS API KEY - IT WILL NOT BE SHOWN AGAIN");
            tracing::info!("============================================");
        }
        Ok(None) => {}
        Err(e) => fatal("Failed to bootstrap operator", e),
    }
}

fn run_seed(state: &AppState) {
    let conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => fatal("Failed to get db connection for seeding", e),
    };

    let data = match seed_dev_data(&conn, &state.audit) {
        Ok(Some(data)) => data,
        Ok(None) => return,
        Err(e) => fatal("Failed to seed dev data", e),
    };

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED");
    tracing::info!("Operator: {} ({})", data.operator.email, data.operator.name);
    tracing::info!("Organization: {} (id: {})", data.organization.name, data.organization.id);
    tracing::info!(
        "License: {} plan, {} editor / {} player seats",
        data.license.plan,
        data.license.seats_editor,
        data.license.seats_player
    );
    tracing::info!("============================================");

    println!();
    println!("--- COPY FROM HERE ---");
    println!("  operator_api_key: {}", data.operator_api_key);
    println!("  organization_id: {}", data.organization.id);
    println!("  license_id: {}", data.license.id);
    println!("  license_key: {}", data.license.license_key);
    println!("--- END COPY ---");
    println!();
}

/// Periodically drops credential records past expiry plus the refresh grace window.
fn spawn_purge_task(state: AppState, interval: std::time::Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let lifecycle = state.lifecycle.clone();
            match state.with_conn(move |conn| lifecycle.purge_expired(conn, None)).await {
                Ok(count) if count > 0 => {
                    tracing::debug!("Purged {} expired credentials", count);
                }
                Ok(_) => {}
                Err(e) if e.is_transient() => {
                    tracing::debug!("Purge skipped, store busy: {}", e);
                }
                Err(e) => {
                    tracing::warn!("Failed to purge expired credentials: {}", e);
                }
            }
        }
    });

    tracing::info!("Background purge task started (every {:?})", interval);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.generate_key {
        let key = SigningKeyMaterial::generate();
        println!("SIGNING_PRIVATE_KEY={}", key.seed_b64());
        println!("SIGNING_PUBLIC_KEY={}", key.public_key_b64());
        return;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatcheck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => fatal("Invalid configuration", e),
    };

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if !config.seat_limit_enforced {
        tracing::warn!("Seat limits are NOT enforced (SEAT_LIMIT_ENFORCED=false)");
    }

    let db_pool = create_pool(&config.database_path, config.db_pool_size)
        .unwrap_or_else(|e| fatal("Failed to create database pool", e));
    let audit_pool = create_pool(&config.audit_database_path, config.db_pool_size)
        .unwrap_or_else(|e| fatal("Failed to create audit database pool", e));

    match db_pool.get() {
        Ok(conn) => init_db(&conn).unwrap_or_else(|e| fatal("Failed to initialize database", e)),
        Err(e) => fatal("Failed to get connection", e),
    }
    match audit_pool.get() {
        Ok(conn) => init_audit_db(&conn)
            .unwrap_or_else(|e| fatal("Failed to initialize audit database", e)),
        Err(e) => fatal("Failed to get audit connection", e),
    }

    let state = seatcheck::build_state(&config, db_pool, audit_pool, Entitlements::standard())
        .unwrap_or_else(|e| fatal("Invalid configuration", e));

    if !state.audit.is_enabled() {
        tracing::warn!("Audit logging is disabled");
    }

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set SEATCHECK_ENV=dev)");
        } else {
            run_seed(&state);
        }
    }

    if let Some(ref email) = config.bootstrap_operator_email {
        run_bootstrap(&state, email);
    }

    spawn_purge_task(state.clone(), config.purge_interval);

    let app = seatcheck::app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| fatal("Failed to bind to address", e));

    tracing::info!(
        "Seatcheck listening on {} (credential TTL {}s)",
        addr,
        config.credential_ttl_secs
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        fatal("Server error", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
