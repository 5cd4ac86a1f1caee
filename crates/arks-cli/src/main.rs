//! arks - artifact redirect keys CLI

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use arks_cli::cmd;
use arks_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so rendered output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                cancel.cancel();
            }
        }
    });

    let port = cli.port;
    match cli.command {
        Commands::Render { kind } => cmd::render::render(port, kind, cancel).await,
        Commands::Query { id } => cmd::query::query(port, &id).await,
        Commands::Commit => cmd::commit::commit(port, cancel).await,
        Commands::Diff => cmd::diff::diff(port, cancel).await,
        Commands::Test => cmd::conflicts::test(port, cancel).await,
        Commands::Serve {
            addr,
            redirect_prefix,
        } => arks_cli::server::serve(port, addr, redirect_prefix, cancel).await,
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
