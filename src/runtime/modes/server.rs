//! Server mode
//!
//! Configures and starts the HTTP server with all routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::services::{AppStartTime, configure};
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_startup().await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let link_service = startup.link_service.clone();
    let config = crate::config::get_config();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let db_for_shutdown = startup.storage.get_db().clone();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!(
        "Starting server at http://{} (public links under {})",
        bind_address, config.server.base_url
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000")),
            )
            .configure(configure)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
