use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use routeguard::request::AuthRequest;
use routeguard::rule::Verdict;
use routeguard::token::Token;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Validate the config and print the rule table. With `--path`, also show how a
/// request would be decided.
#[derive(Args)]
pub struct CheckArgs {
    /// Method of the request to evaluate
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Path of the request to evaluate
    #[arg(short, long)]
    pub path: Option<String>,

    /// Bearer token sent with the request
    #[arg(short, long)]
    pub token: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait(?Send)]
impl RunCommand for CheckArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;

        let cfg = self.config.load()?;
        let engine = cfg.build_engine()?;

        for (idx, rule) in engine.rules().iter().enumerate() {
            println!("#{idx}\t{}", rule.describe());
        }

        let path = match self.path.as_ref() {
            Some(path) => path,
            None => return Ok(()),
        };

        let req = AuthRequest::new(self.method.to_uppercase(), path.clone())
            .with_token(self.token.clone().map(Token::new));
        let rule = engine.select(&req)?;
        println!();
        println!("Matched: {}", rule.describe());

        match engine.evaluate(req).await? {
            Verdict::Proceed(req) => match req.context().token_info() {
                Some(info) => println!("Result: allow (uid {})", info.uid),
                None => println!("Result: allow"),
            },
            Verdict::Reject(rejection) => println!("Result: reject {}", rejection.status()),
        }

        Ok(())
    }
}
