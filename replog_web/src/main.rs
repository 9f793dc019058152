use clap::{Parser, Subcommand};
use replog_core::export::{export_to_path, write_csv};
use replog_core::{Config, Result, SortSpec};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replog")]
#[command(about = "Workout log web server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the entry store connection string
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web application (default)
    Serve {
        /// Override the listening port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write every entry as CSV, newest first
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    replog_core::logging::init(cli.verbose);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.server.port = port;
            }
            replog_web::run(config).await
        }
        Some(Commands::Export { out }) => cmd_export(&config, out),
        None => replog_web::run(config).await,
    }
}

fn cmd_export(config: &Config, out: Option<PathBuf>) -> Result<()> {
    config.validate()?;
    let store = replog_core::connect(&config.database.url)?;
    let entries = store.list_all(&SortSpec::newest_first())?;

    match out {
        Some(path) => {
            let count = export_to_path(&entries, &path)?;
            eprintln!("✓ Exported {} entries to {}", count, path.display());
        }
        None => {
            write_csv(&entries, std::io::stdout().lock())?;
        }
    }

    Ok(())
}
