//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::TradebookError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:2022";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "tradebook", about = "Programs, assets and trades over SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the JSON procedure server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create the database schema
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::InitDb { config } => run_init_db(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradebookError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// `RUST_LOG` wins over `[log] level`.
pub fn init_logging(config: &dyn ConfigPort) {
    let level = config
        .get_string("log", "level")
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, TradebookError> {
    let listen = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    listen.parse().map_err(|e: std::net::AddrParseError| TradebookError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("{listen}: {e}"),
    })
}

fn fail(err: &TradebookError) -> ExitCode {
    log::error!("{err}");
    eprintln!("error: {err}");
    ExitCode::from(err)
}

#[cfg(feature = "sqlite")]
fn open_store(
    config: &dyn ConfigPort,
) -> Result<crate::adapters::sqlite::SqliteStore, TradebookError> {
    let store = crate::adapters::sqlite::SqliteStore::from_config(config)?;
    store.initialize_schema()?;
    Ok(store)
}

fn run_init_db(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        eprintln!("Loading config from {}", config_path.display());
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };
        init_logging(&config);

        match open_store(&config) {
            Ok(_) => {
                log::info!("schema ready");
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = config_path;
        eprintln!("error: sqlite feature is required for init-db");
        ExitCode::from(1)
    }
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::sync::Arc;

        eprintln!("Loading config from {}", config_path.display());
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };
        init_logging(&config);

        let store = match open_store(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        let addr = match listen_addr(&config) {
            Ok(a) => a,
            Err(e) => return fail(&e),
        };

        let router = build_router(AppState {
            store: Arc::new(store),
        });

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&TradebookError::Io(e)),
        };
        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            log::info!("listening on {addr}");
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&TradebookError::Io(e)),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_init_db() {
        let cli = Cli::try_parse_from(["tradebook", "init-db", "--config", "t.ini"]).unwrap();
        match cli.command {
            Command::InitDb { config } => assert_eq!(config, PathBuf::from("t.ini")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn listen_defaults_and_validates() {
        let empty = FileConfigAdapter::from_string("[web]\n").unwrap();
        assert_eq!(listen_addr(&empty).unwrap(), DEFAULT_LISTEN.parse::<SocketAddr>().unwrap());

        let custom = FileConfigAdapter::from_string("[web]\nlisten = 0.0.0.0:8080\n").unwrap();
        assert_eq!(listen_addr(&custom).unwrap().port(), 8080);

        let bad = FileConfigAdapter::from_string("[web]\nlisten = localhost\n").unwrap();
        assert!(matches!(
            listen_addr(&bad),
            Err(TradebookError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(&PathBuf::from("/nonexistent/tradebook.ini")).is_err());
    }
}
