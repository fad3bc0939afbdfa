use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Verdict product service
#[derive(Debug, Parser)]
#[command(name = "verdict", about = "Product service with classified error responses")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "verdict.toml", env = "VERDICT_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VERDICT_LISTEN")]
    pub listen: Option<SocketAddr>,
}
