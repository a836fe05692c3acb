//! contactaudit CLI: find HEART contacts whose details are missing from LGL.
//!
//! Pulls every HEART contact and every Little Green Light constituent, then
//! writes a dated CSV listing the contacts LGL does not fully know about.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
