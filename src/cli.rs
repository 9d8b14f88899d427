use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fleetwatch",
    about = "real-time sync client for the fleet-monitoring dashboard",
    version
)]
pub struct Args {
    /// Push (WebSocket) endpoint URL
    #[arg(
        short,
        long,
        default_value = "wss://api.fleetwatch.example/api/v1/ws/dashboard"
    )]
    pub url: String,

    /// REST API base URL for snapshot fetches
    #[arg(long, default_value = "https://api.fleetwatch.example/api/v1/")]
    pub api_url: String,

    /// Environment variable holding the bearer token
    #[arg(long, default_value = "FLEETWATCH_TOKEN")]
    pub token_env: String,

    /// File holding the bearer token (takes precedence over --token-env)
    #[arg(long)]
    pub token_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Enable metrics server
    #[arg(long)]
    pub metrics: bool,

    /// Metrics server port
    #[arg(long, default_value = "9090")]
    pub metrics_port: u16,

    /// Seconds between live-status summaries
    #[arg(long, default_value = "10")]
    pub status_interval: u64,
}
