use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use log::debug;
use routeguard::server::AuthServer;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Start the authorization server answering reverse proxy sub-requests
#[derive(Args)]
pub struct ServeArgs {
    /// Override the bind address from the config file
    #[arg(short, long)]
    pub bind: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait(?Send)]
impl RunCommand for ServeArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;

        let cfg = self.config.load()?;
        debug!("Use config: {:?}", cfg);

        let engine = cfg.build_engine()?;

        let bind = self.bind.clone().unwrap_or(cfg.bind);
        let mut server = AuthServer::new(bind, engine);
        if cfg.workers > 0 {
            server.set_workers(cfg.workers);
        }

        server.run().await
    }
}
