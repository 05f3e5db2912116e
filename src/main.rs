use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use filesync::cli::{
    AdminCommands, UserCommands, run_init, run_user_add, run_user_list, run_user_remove,
};
use filesync::config::ServerConfig;
use filesync::server::{AppState, create_router};
use filesync::store::{SqliteStore, Store, UserStore};

#[derive(Parser)]
#[command(name = "filesync")]
#[command(about = "A multi-user file sync server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags below override its values
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!("Server not initialized. Run 'filesync admin init' first to create the database and an admin user.");
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    if !store.has_admin_user()? {
        bail!("Server not initialized. Run 'filesync admin init' first to create the database and an admin user.");
    }

    let store: Arc<dyn Store> = Arc::new(store);
    let state = Arc::new(AppState::new(store.clone()));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutting down");
        })
        .await?;

    store.close()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("filesync=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                email,
                password,
                non_interactive,
            } => run_init(data_dir, email, password, non_interactive)?,
            AdminCommands::User { command } => match command {
                UserCommands::Add {
                    data_dir,
                    email,
                    password,
                    admin,
                    non_interactive,
                } => run_user_add(data_dir, email, password, admin, non_interactive)?,
                UserCommands::List { data_dir, json } => run_user_list(data_dir, json)?,
                UserCommands::Remove {
                    data_dir,
                    user_id,
                    non_interactive,
                    yes,
                } => run_user_remove(data_dir, user_id, non_interactive, yes)?,
            },
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::from_file(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }

            serve(config).await?;
        }
    }

    Ok(())
}
