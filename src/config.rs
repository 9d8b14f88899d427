/// file: src/config.rs
/// description: runtime configuration assembled from CLI arguments
use crate::cli::Args;
use crate::creds::{CredentialProvider, EnvCredentials, TokenFileCredentials};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub push: PushConfig,
    pub api: ApiConfig,
    pub metrics: MetricsConfig,
    pub status_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub url: Url,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Config {
            push: PushConfig {
                url: Url::parse(&args.url)?,
            },
            api: ApiConfig {
                base_url: Url::parse(&args.api_url)?,
            },
            metrics: MetricsConfig {
                enabled: args.metrics,
                port: args.metrics_port,
            },
            status_interval: Duration::from_secs(args.status_interval),
        })
    }
}

/// Builds the credential provider from the CLI selection. A token file wins
/// over the environment variable; both read at call time.
pub fn credential_provider(args: &Args) -> Arc<dyn CredentialProvider> {
    match &args.token_file {
        Some(path) => Arc::new(TokenFileCredentials::new(path)),
        None => Arc::new(EnvCredentials::new(args.token_env.clone())),
    }
}
