//! Command-line and environment configuration.
//!
//! # Responsibility
//! - Declare global storage/logging options and the subcommands.
//! - Convert parsed options into core and server configuration types.
//!
//! # Invariants
//! - Every option has an environment-variable fallback; flags win over env.

use clap::{Args, Parser, Subcommand};
use fornecedores_api::{ServerConfig, DEFAULT_PORT};
use fornecedores_core::{Datastore, DbOptions};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "fornecedores", version, about = "Supplier registry server and fixtures")]
pub struct Cli {
    /// SQLite database file.
    #[arg(
        long,
        env = "DATABASE_PATH",
        default_value = "database.sqlite",
        value_name = "PATH",
        global = true
    )]
    pub database: PathBuf,
    /// Milliseconds a statement waits on a locked database.
    #[arg(long, env = "BUSY_TIMEOUT_MS", default_value_t = 5000, global = true)]
    pub busy_timeout_ms: u64,
    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files; stderr when unset.
    #[arg(long, env = "LOG_DIR", value_name = "DIR", global = true)]
    pub log_dir: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Create the supplier table if missing and verify its layout.
    Setup,
    /// Replace all suppliers with the fixed sample set.
    Seed,
    /// Delete every supplier.
    Reset,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Directory with the static web UI.
    #[arg(long, env = "PUBLIC_DIR", value_name = "DIR")]
    pub public_dir: Option<PathBuf>,
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn datastore(&self) -> Datastore {
        Datastore::new(
            self.database.clone(),
            DbOptions {
                busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            },
        )
    }
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: SocketAddr::new(self.host, self.port),
            public_dir: self.public_dir.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
