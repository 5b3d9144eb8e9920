//! HTTP server for the course gradebook.
//!
//! # Responsibility
//! - Resolve process configuration and open the course store.
//! - Serve the course record API until shutdown is requested.

pub mod config;
pub mod http;

use config::StoreLocation;
use gradebook_core::db::{open_db, open_db_in_memory, DbResult};
use log::info;
use rusqlite::Connection;
use std::future::Future;
use tokio::net::TcpListener;

/// Opens the configured store and ensures its schema exists.
pub fn open_store(location: &StoreLocation) -> DbResult<Connection> {
    match location {
        StoreLocation::File(path) => open_db(path),
        StoreLocation::Memory => open_db_in_memory(),
    }
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    conn: Connection,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("event=server_listen module=server status=ok addr={addr}");

    let app = http::router(http::AppState::new(conn));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}
