//! Delivery client — streams blocks from the ordering service to
//! stdout, optionally verifying ordering-node signatures against the
//! BFT quorum rule.

use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use pontoon_client::{BlockVerifier, ClientConfig, DeliverClient, QuorumParams};
use pontoon_msp::{LocalMsp, LocalSigner, MspError, MspManager};
use pontoon_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(
    name = "pontoon-client",
    about = "Streams delivered blocks from the ordering service"
)]
struct Cli {
    /// Delivery endpoint to connect to (host:port). Defaults to the
    /// configured server.
    #[arg(long, env = "PONTOON_SERVER")]
    server: Option<String>,

    /// The channel ID to deliver from.
    #[arg(long = "channel-id", env = "PONTOON_CHANNEL_ID")]
    channel_id: Option<String>,

    /// Only print the block number, not the block contents.
    #[arg(long)]
    quiet: bool,

    /// Requested block range: -2 to start from the oldest block and
    /// keep at it indefinitely, -1 likewise from the newest, N >= 0 to
    /// fetch block N only.
    #[arg(long, default_value_t = -2, allow_hyphen_values = true)]
    seek: i64,

    /// Total number of ordering nodes operating in the system.
    #[arg(short = 'n', long = "nodes", default_value_t = 4)]
    nodes: i64,

    /// Number of Byzantine ordering nodes being tolerated.
    #[arg(short = 'f', long = "faults", default_value_t = 1)]
    faults: i64,

    /// Verify block signatures.
    #[arg(long)]
    verify: bool,

    /// Path to a TOML configuration file.
    #[arg(long, env = "PONTOON_CLIENT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(LogFormat::Human, &cli.log_level);

    let config = match &cli.config {
        Some(path) => match ClientConfig::from_toml_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config: {e}");
                process::exit(1);
            }
        },
        None => ClientConfig::default(),
    };

    if cli.seek < -2 {
        eprintln!("wrong seek value {}", cli.seek);
        Cli::command().print_help().ok();
        process::exit(0);
    }

    // Historic contract: a failed MSP initialisation reports the error
    // but exits with code 0.
    let msp = match load_msp(&config) {
        Ok(msp) => msp,
        Err(e) => {
            eprintln!("failed to initialize local MSP: {e}");
            process::exit(0);
        }
    };
    let signer = load_signer(&config);

    let server = cli.server.as_deref().unwrap_or(&config.server);
    let channel_id = cli.channel_id.as_deref().unwrap_or(&config.channel_id);

    let mut client = match DeliverClient::connect(server, channel_id, signer, cli.quiet).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error connecting: {e}");
            return;
        }
    };

    let seek_result = match cli.seek {
        -2 => client.seek_oldest().await,
        -1 => client.seek_newest().await,
        n => client.seek_single(n as u64).await,
    };
    if let Err(e) = seek_result {
        eprintln!("error sending seek request: {e}");
        return;
    }

    let verifier = cli
        .verify
        .then(|| BlockVerifier::new(msp, QuorumParams::new(cli.nodes, cli.faults)));
    client.read_until_close(verifier.as_ref()).await;
}

fn load_msp(config: &ClientConfig) -> Result<MspManager, MspError> {
    let local = match &config.msp_dir {
        Some(dir) => LocalMsp::load(dir, config.msp_id.as_str())?,
        None => LocalMsp::new(config.msp_id.as_str()),
    };
    Ok(MspManager::new(local))
}

/// Use the MSP directory's signing key when one is present; otherwise
/// an ephemeral key (the seek envelope merely has to be well-formed).
fn load_signer(config: &ClientConfig) -> LocalSigner {
    if let Some(dir) = &config.msp_dir {
        let key_path = dir.join("signer.key");
        if key_path.exists() {
            match LocalSigner::from_key_file(config.msp_id.as_str(), &key_path) {
                Ok(signer) => return signer,
                Err(e) => {
                    tracing::warn!(error = %e, "could not load signing key, using an ephemeral key");
                }
            }
        }
    }
    LocalSigner::generate(config.msp_id.as_str())
}
