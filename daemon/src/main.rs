//! pontoon daemon — runs the consensus bridge as a standalone process.
//!
//! Brings up the system channel's chain against an in-memory ledger,
//! which is enough to drive an external consensus engine end-to-end:
//! envelopes submitted by tooling flow out through the send pool and
//! ordered blocks flow back in and are appended. Production deployments
//! embed the bridge crate in the ordering service instead and supply a
//! real ledger behind the support trait.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pontoon_bridge::{
    BridgeConfig, BridgeContext, ChannelRole, Consenter, MemoryLedger, ShutdownController,
};
use pontoon_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "pontoon-daemon", about = "pontoon consensus bridge daemon")]
struct Cli {
    /// Channel ID of the system channel.
    #[arg(long, default_value = "system-channel", env = "PONTOON_SYSTEM_CHANNEL")]
    channel_id: String,

    /// Number of IPC connections in the send pool.
    #[arg(long, env = "PONTOON_POOL_SIZE")]
    pool_size: Option<usize>,

    /// TCP port the engine delivers ordered blocks on.
    #[arg(long, env = "PONTOON_RECV_PORT")]
    recv_port: Option<u16>,

    /// Directory holding the engine's IPC socket and ready marker.
    #[arg(long, env = "PONTOON_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "PONTOON_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => Some(
            BridgeConfig::from_toml_file(&path.display().to_string())
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", path.display()))?,
        ),
        None => None,
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(pool_size) = cli.pool_size {
        config.pool_size = pool_size;
    }
    if let Some(recv_port) = cli.recv_port {
        config.recv_port = recv_port;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }
    config.log_level = cli.log_level;

    init_logging(LogFormat::parse(&config.log_format), &config.log_level);

    tracing::info!(
        channel = %cli.channel_id,
        pool_size = config.pool_size,
        recv_port = config.recv_port,
        "starting pontoon bridge"
    );

    let batch_timeout = config.batch_timeout();
    let ctx = BridgeContext::new(config);
    let consenter = Consenter::new(ctx);

    let ledger = Arc::new(MemoryLedger::new(cli.channel_id.clone(), batch_timeout));
    let support: Arc<dyn pontoon_bridge::ConsenterSupport> = ledger.clone() as Arc<dyn pontoon_bridge::ConsenterSupport>;
    let chain = consenter.handle_chain(support, ChannelRole::System);
    chain.start().await?;

    let shutdown = ShutdownController::new();
    shutdown.register(chain);
    shutdown.run_until_signal().await;

    tracing::info!(height = ledger.height().await, "pontoon daemon exited cleanly");
    Ok(())
}
