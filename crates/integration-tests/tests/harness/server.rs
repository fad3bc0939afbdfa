//! Test server wrapper that starts Verdict on a random port

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use verdict_config::Config;
use verdict_core::{Chain, Classification, Failure, RequestContext};
use verdict_mid::{ErrorReporter, Errors, Logger, Panics, log_line};
use verdict_products::ProductStore;
use verdict_server::{App, Server};

/// Reporter that keeps every error line for inspection
#[derive(Default)]
pub struct CapturedLog {
    lines: Mutex<Vec<String>>,
}

impl CapturedLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ErrorReporter for CapturedLog {
    fn report(&self, context: &RequestContext, _classification: &Classification, failure: &Failure) {
        self.lines.lock().unwrap().push(log_line(&context.trace_id, failure));
    }
}

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    log: Arc<CapturedLog>,
}

impl TestServer {
    /// Start a test server serving the product routes over `store`
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config, store: impl ProductStore) -> anyhow::Result<Self> {
        let log = Arc::new(CapturedLog::default());

        let chain = Chain::new()
            .with(Logger)
            .with(Errors::new(log.clone()))
            .with(Panics);
        let app = verdict_products::routes(App::new(chain, config.server.body_limit), store);
        let server = Server::new(&config, app)?;

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(
                listener,
                server.into_router().into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                shutdown_clone.cancelled().await;
            })
            .await
            .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            shutdown,
            client,
            log,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Error lines reported so far
    pub fn logged(&self) -> Vec<String> {
        self.log.lines()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
