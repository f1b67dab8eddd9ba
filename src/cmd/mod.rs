mod check;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use routeguard::config::Config;
use routeguard::logs;

#[async_trait(?Send)]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the config file. Defaults to `$ROUTEGUARD_CONFIG`, then to
    /// `/etc/routeguard/config.toml`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// The log level: error, warn, info or debug.
    #[arg(long, env = "ROUTEGUARD_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl LogArgs {
    pub fn init(&self) -> Result<()> {
        logs::init(&self.log_level)
    }
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Check(check::CheckArgs),
    Serve(serve::ServeArgs),
}

#[async_trait(?Send)]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(args) => args.run().await,
            Commands::Serve(args) => args.run().await,
        }
    }
}
