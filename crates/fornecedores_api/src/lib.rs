//! HTTP surface for the supplier registry.
//!
//! # Responsibility
//! - Route supplier CRUD and fixture requests to core services.
//! - Serve the same routes at `/` and under `/api`, plus an optional static UI.
//!
//! # Invariants
//! - The supplier table is created and verified before the listener accepts
//!   connections.
//! - Each request uses its own scoped storage connection.

pub mod error;
pub mod routes;

use axum::http::StatusCode;
use axum::Router;
use fornecedores_core::db::schema;
use fornecedores_core::{
    Datastore, DbError, FixtureService, SqliteSupplierRepository, SupplierService,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

pub use error::ApiError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Listener and routing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directory served for paths no API route matches.
    pub public_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            public_dir: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Services shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub(crate) suppliers: Arc<SupplierService<SqliteSupplierRepository>>,
    pub(crate) fixtures: Arc<FixtureService<SqliteSupplierRepository>>,
}

impl AppState {
    pub fn new(datastore: Datastore) -> Self {
        let repo = SqliteSupplierRepository::new(datastore);
        Self {
            suppliers: Arc::new(SupplierService::new(repo.clone())),
            fixtures: Arc::new(FixtureService::new(repo)),
        }
    }
}

#[derive(Debug)]
pub enum ServerError {
    Setup(DbError),
    Bind(SocketAddr, std::io::Error),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(err) => write!(f, "database setup failed: {err}"),
            Self::Bind(addr, err) => write!(f, "failed to bind {addr}: {err}"),
            Self::Io(err) => write!(f, "server error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Setup(err) => Some(err),
            Self::Bind(_, err) | Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Setup(value)
    }
}

/// Builds the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = routes::supplier_routes();
    let mut router = Router::new().merge(api.clone()).nest("/api", api);
    if let Some(dir) = &config.public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Sets up storage, binds `config.addr` and serves until Ctrl-C.
pub async fn serve(datastore: Datastore, config: ServerConfig) -> Result<(), ServerError> {
    schema::setup(&datastore).await?;

    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|err| ServerError::Bind(config.addr, err))?;
    let local_addr = listener.local_addr().map_err(ServerError::Io)?;
    info!(
        "event=server_start module=api status=ok addr={} database={} public_dir={}",
        local_addr,
        datastore.path().display(),
        config
            .public_dir
            .as_deref()
            .map_or_else(|| "none".to_string(), |dir| dir.display().to_string())
    );

    let router = build_router(AppState::new(datastore), &config);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Io)?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=api status=error error={err}");
        std::future::pending::<()>().await;
    }
}
