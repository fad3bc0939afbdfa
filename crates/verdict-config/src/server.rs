use std::net::SocketAddr;

use serde::Deserialize;

use crate::health::HealthConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Largest request body accepted, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    /// Incoming header whose value is reused as the trace identifier
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            body_limit: default_body_limit(),
            request_id_header: default_request_id_header(),
            health: HealthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Address to bind, defaulting to `0.0.0.0:3000`
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)))
    }
}

const fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}
