//! Application startup and lifecycle management.
//!
//! Builds the HTTP router (analysis endpoints, health/metrics, static assets)
//! and owns the listener until shutdown.

use crate::config::AnalysisConfig;
use crate::handlers::{
    analyze_image, download_report, health_check, metrics_endpoint, readiness_check,
};
use crate::services::providers::{self, VisionProvider};
use crate::services::UploadStore;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AnalysisConfig,
    pub provider: Arc<dyn VisionProvider>,
    pub uploads: UploadStore,
}

/// Build the full HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_bytes;
    let public_dir = ServeDir::new(&state.config.server.public_dir);

    Router::new()
        .route(
            "/analyze",
            post(analyze_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download", post(download_report))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback_service(public_dir)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>),
        )
        // Outermost so the request id exists before the span is created
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the provider selected by configuration.
    pub async fn build(config: AnalysisConfig) -> Result<Self, AppError> {
        let provider = providers::from_config(&config).map_err(|e| {
            tracing::error!("Failed to initialize vision provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: AnalysisConfig,
        provider: Arc<dyn VisionProvider>,
    ) -> Result<Self, AppError> {
        let uploads = UploadStore::new(&config.upload.dir).await.map_err(|e| {
            tracing::error!(
                "Failed to create upload directory {}: {}",
                config.upload.dir.display(),
                e
            );
            AppError::from(e)
        })?;

        tracing::info!(
            provider = provider.name(),
            upload_dir = %config.upload.dir.display(),
            public_dir = %config.server.public_dir.display(),
            "Initialized analysis pipeline"
        );

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Analysis service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState {
                config,
                provider,
                uploads,
            },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the application state.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
