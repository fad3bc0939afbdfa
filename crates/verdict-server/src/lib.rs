mod app;
mod request_context;

use std::net::SocketAddr;

use axum::Router;
use http::HeaderName;
use tower_http::trace::TraceLayer;
use verdict_config::Config;

pub use app::App;
pub use axum::routing::MethodFilter;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration and application routes
    ///
    /// # Errors
    ///
    /// Returns an error if the configured request id header is not a valid
    /// header name
    pub fn new(config: &Config, app: App) -> anyhow::Result<Self> {
        let mut router = app.into_router();

        // Health check
        if config.server.health.enabled {
            router = router.route(&config.server.health.path, axum::routing::get(|| async { "ok" }));
        }

        // Request context (outermost application layer, every route gets one)
        let request_id_header = HeaderName::try_from(config.server.request_id_header.as_str())?;
        router = router.layer(axum::middleware::from_fn(move |req, next| {
            let header = request_id_header.clone();
            async move { request_context::request_context_middleware(header, req, next).await }
        }));

        // Tracing
        router = router.layer(TraceLayer::new_for_http());

        Ok(Self {
            router,
            listen_address: config.server.listen_address(),
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

        Ok(())
    }
}
