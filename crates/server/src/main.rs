use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use environment::SandboxFactory;
use server::{
    config::{load_settings, Overrides},
    serve, TcpReplyTransport,
};
use session::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serves one simulation session over newline-delimited JSON request/reply.
#[derive(Parser, Debug)]
#[command(name = "server", version)]
struct Args {
    /// Address to bind, e.g. 127.0.0.1:5555
    #[arg(long, conflicts_with = "port")]
    bind: Option<String>,
    /// Port to bind on all interfaces
    #[arg(short, long)]
    port: Option<u16>,
    /// Label for this session in logs
    #[arg(long)]
    session_name: Option<String>,
    /// Log every command at debug level
    #[arg(short, long)]
    verbose: bool,
    /// Settings file (defaults to ./server.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?.with_overrides(&Overrides {
        bind_addr: args.bind,
        port: args.port,
        session_name: args.session_name,
        verbose: args.verbose,
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut transport = TcpReplyTransport::bind(&settings.bind_addr).await?;
    info!(
        session = %settings.session_name,
        addr = %transport.local_addr()?,
        "environment server started"
    );

    let mut session = Session::new(SandboxFactory);
    let summary = serve(&mut transport, &mut session).await?;
    info!(exchanges = summary.exchanges, "environment server stopped");
    Ok(())
}
