//! social CLI: manage users, post and render messages, browse hashtags and activity.
//! Config from env (`.env` supported) and optional CLI args.

use anyhow::Result;
use clap::Parser;
use social_cli::{load_config, run, App, Cli};
use social_core::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.database_url.clone())?;
    init_tracing(&config.log_file)?;

    let app = App::connect(&config).await?;
    let output = run(&app, cli.command).await?;
    println!("{}", output);

    Ok(())
}
