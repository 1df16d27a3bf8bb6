use std::sync::Arc;

use anyhow::Result;
use axum::{extract::Request, middleware};
use tokio::{net::TcpListener, sync::Notify};
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use picture_registry::{
    CONFIG, api,
    common::{AppState, listen_for_shutdown, metrics},
    db::PictureStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .init();

    let metrics_router = metrics::prometheus_router()?;

    let store = match PictureStore::load(&CONFIG.registry_pictures_file) {
        Ok(store) => {
            let count = store.count_pictures().await?;
            metrics::record_picture_count(count);
            tracing::info!(
                "loaded {count} pictures from {}",
                CONFIG.registry_pictures_file
            );
            store
        }
        Err(e) => {
            tracing::error!(
                "failed to load pictures from {}: {e}",
                CONFIG.registry_pictures_file
            );
            PictureStore::uninitialized()
        }
    };
    let state = AppState { store };

    let api_router = api::router(state)
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    client_ip = %req.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok())
                    .unwrap_or("unknown"),
                )
            })
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(true))
            .on_failure(DefaultOnFailure::new().level(Level::INFO))
        )
        .layer(RequestBodyLimitLayer::new(1024 * 1024 /* 1MiB */));

    let shutdown_notify = Arc::new(Notify::new());
    tokio::spawn(listen_for_shutdown(shutdown_notify.clone()));

    let api_listener = TcpListener::bind((
        CONFIG.registry_ipv4_address.as_str(),
        CONFIG.registry_port,
    ))
    .await?;
    let metrics_listener = TcpListener::bind((
        CONFIG.prometheus_ipv4_address.as_str(),
        CONFIG.prometheus_port,
    ))
    .await?;

    tracing::info!("⇢ API listening on: http://{}", api_listener.local_addr()?);
    tracing::info!(
        "⇢ Metrics listening on: http://{}/metrics",
        metrics_listener.local_addr()?
    );

    let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });
    let metrics_server = axum::serve(metrics_listener, metrics_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });

    tokio::try_join!(api_server, metrics_server)?;

    Ok(())
}
