use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marksheet::{api, config::ServerConfig, db};

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Student marks register with grade and CGPA computation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Apply pending schema migrations and exit
    Migrate {
        /// Path to the SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "marksheet=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &ServerConfig) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Marksheet server listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { host, port, db }) => {
            serve(config.with_overrides(host, port, db)).await?;
        }
        Some(Commands::Migrate { db }) => {
            let config = config.with_overrides(None, None, db);
            open_database(&config)?;
            tracing::info!("Database is up to date");
        }
        None => serve(config).await?,
    }

    Ok(())
}
