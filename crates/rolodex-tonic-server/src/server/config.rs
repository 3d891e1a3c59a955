use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `rolodex-tonic-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for a local demo.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rolodex-tonic-server",
    version,
    about = "A gRPC person registry covering every streaming call shape"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix
    /// socket).
    ///
    /// Example: "127.0.0.1:8081" or "/tmp/rolodex.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:8081"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be
    /// a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Delay, in milliseconds, before each streamed response after the first
    /// (`ListPersons`) or before every echoed response (`AskAndGetPersons`).
    ///
    /// Makes incremental delivery visible to a human watching a client. Set
    /// to 0 to stream as fast as the client reads.
    ///
    /// Environment variable: `PACING_DELAY_MS`
    #[arg(long, env = "PACING_DELAY_MS", default_value_t = 500)]
    pub pacing_delay_ms: u64,

    /// Capacity of the channel between a streaming handler and the gRPC
    /// response stream.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for in-flight streaming calls to finish on shutdown
    /// before they are cut off.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,

    /// Start with an empty store instead of the demo records.
    ///
    /// Environment variable: `NO_SEED`
    #[arg(long, env = "NO_SEED", default_value_t = false)]
    pub no_seed: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub pacing_delay: Duration,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: Duration,
    pub seed: bool,
}

impl ServerConfig {
    /// Configuration for in-process servers: no pacing, empty store.
    pub fn unpaced() -> Self {
        Self {
            server_addr: String::from("127.0.0.1:0"),
            uds: false,
            pacing_delay: Duration::ZERO,
            stream_buffer_size: 8,
            shutdown_timeout: Duration::from_secs(1),
            seed: false,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.server_addr.is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            pacing_delay: Duration::from_millis(args.pacing_delay_ms),
            stream_buffer_size: args.stream_buffer_size,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            seed: !args.no_seed,
        })
    }
}
