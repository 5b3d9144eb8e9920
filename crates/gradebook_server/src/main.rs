//! Gradebook server entry point.

use gradebook_server::config::ServerConfig;
use log::{error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("gradebook: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = gradebook_core::init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("gradebook: {err}");
        return ExitCode::FAILURE;
    }

    let conn = match gradebook_server::open_store(&config.store) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=server_start module=server status=error error_code=store_open_failed error={err}");
            return ExitCode::FAILURE;
        }
    };

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("event=server_start module=server status=error error_code=bind_failed addr={addr} error={err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = gradebook_server::serve(listener, conn, shutdown_signal()).await {
        error!("event=server_run module=server status=error error={err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=server_shutdown module=server status=start signal=ctrl_c"),
        Err(err) => {
            // Without a signal handler the server runs until killed.
            error!("event=server_shutdown module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    }
}
