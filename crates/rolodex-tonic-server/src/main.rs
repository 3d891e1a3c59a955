use clap::Parser;
use rolodex_tonic_server::server::{
    bootstrap::{serve, shutdown_signal},
    config::{CliArgs, ServerConfig},
    service::PersonService,
    telemetry::init_telemetry,
};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;
    let service = PersonService::new(config.clone());

    let res = serve(config, service, shutdown_signal()).await;
    providers.shutdown();
    res
}
