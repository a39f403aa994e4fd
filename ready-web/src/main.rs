//! ready-web - Program readiness self-assessment service
//!
//! Single-process HTTP service: axum handlers over a SQLite store plus a
//! static question catalog loaded once at startup.

use anyhow::Result;
use clap::Parser;
use ready_common::{auth, catalog, config, db};
use ready_web::{build_router, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ready-web", about = "Program readiness self-assessment service")]
struct Args {
    /// Root data folder (database and catalog override live here)
    #[arg(long)]
    root_folder: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber before anything else
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting readycheck (ready-web) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let pool = db::init_database(&config::database_path(&root_folder)).await?;

    let catalog = catalog::load_catalog(&config::catalog_path(&root_folder))?;
    info!(
        "Question catalog loaded: {} categories",
        catalog.categories.len()
    );

    let token_secret = auth::load_token_secret(&pool).await?;

    let state = AppState::new(pool, catalog, token_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", args.host, args.port)).await?;
    info!("ready-web listening on http://{}:{}", args.host, args.port);
    info!("Health check: http://{}:{}/health", args.host, args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
