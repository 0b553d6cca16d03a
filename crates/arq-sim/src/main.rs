//! Stop-and-Wait ARQ simulator binary.
//!
//! # Usage
//!
//! ```bash
//! # Instant run in virtual time over a clean link
//! arq-sim --payload HELLO
//!
//! # Watch a lossy session unfold on the wall clock (Ctrl-C stops it)
//! arq-sim --payload HELLO --loss 30 --corrupt 10 --ack-loss 20 --realtime
//!
//! # Reproduce a session exactly
//! arq-sim --loss 50 --seed 42
//! ```

use arq_sim::RunConfig;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Stop-and-Wait ARQ simulator
#[derive(Parser, Debug)]
#[command(name = "arq-sim")]
#[command(about = "Alternating-bit Stop-and-Wait ARQ simulator")]
#[command(version)]
struct Args {
    /// Characters to transmit, one per frame
    #[arg(short, long, default_value = "HELLO")]
    payload: String,

    /// Frame loss percentage (0-70)
    #[arg(long, default_value = "0")]
    loss: String,

    /// Frame corruption percentage (0-70)
    #[arg(long, default_value = "0")]
    corrupt: String,

    /// ACK/NAK loss percentage (0-70)
    #[arg(long, default_value = "0")]
    ack_loss: String,

    /// Retransmission timeout in milliseconds
    #[arg(long, default_value = "3000")]
    timeout_ms: String,

    /// Seed for reproducible channel draws
    #[arg(long)]
    seed: Option<u64>,

    /// Pace events on the wall clock instead of running instantly
    #[arg(long)]
    realtime: bool,

    /// Maximum events processed before giving up
    #[arg(long, default_value = "100000")]
    max_steps: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(realtime = args.realtime, seed = ?args.seed, "ARQ simulator starting");

    let config = RunConfig {
        payload: args.payload,
        loss: args.loss,
        corruption: args.corrupt,
        ack_loss: args.ack_loss,
        timeout_ms: args.timeout_ms,
        seed: args.seed,
        realtime: args.realtime,
        max_steps: args.max_steps,
    };

    let outcome = arq_sim::run(config).await?;

    tracing::info!(state = ?outcome.state, "ARQ simulator finished");

    Ok(())
}
