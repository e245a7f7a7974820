mod cli;
mod client;
mod controller;
mod daemon;
mod server;
mod session;

use clap::Parser;

use cli::{default_socket_path, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let socket_path = cli.socket_path.unwrap_or_else(default_socket_path);

    match cli.command {
        Command::Daemon(opts) => {
            // Log filter: HOOPTRACK_LOG takes precedence, then RUST_LOG, then info.
            let filter = std::env::var("HOOPTRACK_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string());
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .init();

            daemon::run_daemon(opts, &socket_path).await?;
        }
        Command::Start => client::cmd_start(&socket_path)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?,
        Command::End => client::cmd_end(&socket_path)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?,
        Command::Stats => client::cmd_stats(&socket_path)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?,
        Command::Status => client::cmd_status(&socket_path)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?,
    }

    Ok(())
}
