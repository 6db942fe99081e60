//! Serve command handler.

use clap::Args;
use medquery_core::{config::AppConfig, AppResult};
use medquery_llm::client_from_config;

/// Run the HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen host (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut config = config.clone();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        config.validate()?;

        let llm = client_from_config(&config)?;
        medquery_server::serve(&config, llm).await
    }
}
