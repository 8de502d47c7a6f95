use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use heritage::cli::{UserCommands, run_user_create, run_user_remove};
use heritage::config::ServerConfig;
use heritage::server::{AppState, create_router};
use heritage::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "heritage")]
#[command(about = "A cataloguing backend for cultural heritage records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init {
        /// Data directory for the database and uploaded media
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags given on the command line take precedence
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and uploaded media
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let config = ServerConfig {
        data_dir: data_path,
        ..ServerConfig::default()
    };
    let db_path = config.db_path();

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!();
    println!("Initialized database at {}", db_path.display());
    println!("Create an account with 'heritage user create' or POST /api/user/create/");
    println!();

    Ok(())
}

fn load_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match path {
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

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("heritage=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            run_init(data_dir)?;
        }
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let config = load_config(config, host, port, data_dir)?;

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!("Server not initialized. Run 'heritage init' first to create the database.");
            }

            let store = SqliteStore::new(&db_path)?;
            store.initialize()?;

            let addr = config.socket_addr()?;
            let state = Arc::new(AppState::new(Arc::new(store), config));
            let app = create_router(state);

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::User { command } => match command {
            UserCommands::Create {
                data_dir,
                email,
                name,
                staff,
                password,
                non_interactive,
            } => {
                run_user_create(data_dir, email, name, staff, password, non_interactive)?;
            }
            UserCommands::Remove {
                data_dir,
                email,
                yes,
                non_interactive,
            } => {
                run_user_remove(data_dir, email, yes, non_interactive).await?;
            }
        },
    }

    Ok(())
}
