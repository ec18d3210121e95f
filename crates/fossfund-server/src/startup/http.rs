//! HTTP server setup module.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, dev::ServiceRequest, middleware::Logger, web};
use tracing::info;

use crate::{
    api::route::routes,
    error::error_pages,
    middleware::{forwarded::ClientInfo, session::SessionMiddleware},
    model::{
        AppState,
        constants::{ACCESS_LOG_FORMAT, ACCESS_LOG_TARGET},
    },
};

/// Registers the shared state, payload limits and all routes.
///
/// Middleware is applied by the caller, so tests can build the same
/// application with `actix_web::test::init_service`.
pub fn configure_app(cfg: &mut web::ServiceConfig, app_state: Arc<AppState>) {
    let max_body_size = app_state.configuration.max_body_size();

    cfg.app_data(web::Data::from(app_state))
        .app_data(web::PayloadConfig::new(max_body_size))
        .service(routes());
}

/// Combined-format access logger
///
/// `%{client}xi` is the client address, taken from `X-Forwarded-For` only
/// when the peer is a trusted proxy.
pub fn access_logger() -> Logger {
    Logger::new(ACCESS_LOG_FORMAT)
        .custom_request_replace("client", |req: &ServiceRequest| {
            match req.app_data::<web::Data<AppState>>() {
                Some(state) => ClientInfo::from_request(req.request(), &state.trusted_proxies).remote,
                None => req
                    .peer_addr()
                    .map(|addr| addr.ip().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .log_target(ACCESS_LOG_TARGET)
}

/// Creates and binds the main HTTP server.
///
/// Requests pass the access logger, then the session middleware, then the
/// error pages before reaching a route.
pub fn main_server(app_state: Arc<AppState>) -> Result<Server, std::io::Error> {
    let configuration = &app_state.configuration;
    let address = configuration.server_address();
    let port = configuration.server_port();
    let workers = configuration.server_workers();
    let keep_alive = configuration.keep_alive();
    let max_connections = configuration.max_connections();

    info!(
        address = %address,
        port,
        workers,
        keep_alive_secs = keep_alive.as_secs(),
        max_connections,
        "Starting HTTP server"
    );

    Ok(HttpServer::new(move || {
        let state = app_state.clone();
        App::new()
            .wrap(error_pages())
            .wrap(SessionMiddleware)
            .wrap(access_logger())
            .configure(move |cfg| configure_app(cfg, state))
    })
    .workers(workers)
    .keep_alive(keep_alive)
    .max_connections(max_connections)
    .bind((address, port))?
    .run())
}
