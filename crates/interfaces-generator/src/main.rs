//! interfaces-generator: TypeScript interfaces from C# records and classes,
//! packaged for npm.

mod cli;
mod config;
mod orchestrator;
mod output;
mod package;

use clap::Parser;
use cli::Args;
use env_logger::Env;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    orchestrator::run(args).await?;
    Ok(())
}
