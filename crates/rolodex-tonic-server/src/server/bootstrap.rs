//! Listener setup and server assembly.
//!
//! Besides `PersonRegistry`, the server exposes gRPC health checking and
//! reflection, accepts HTTP/1 for gRPC-web clients behind a permissive CORS
//! layer, and negotiates zstd/gzip/deflate compression for the registry.

use crate::server::{config::ServerConfig, service::PersonService};
use futures::Stream;
use rolodex_tonic_core::proto::{FILE_DESCRIPTOR_SET, person_registry_server::PersonRegistryServer};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Binds the listener described by `config` and serves `service` until
/// `signal` resolves, then shuts down gracefully.
pub async fn serve<F>(config: ServerConfig, service: PersonService, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;

            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            log_startup_info(&uds_path, &config);
            let res = serve_with_incoming(service, UnixListenerStream::new(uds), signal).await;
            // Best effort: a panic can still leave the socket file behind.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp = TcpListener::bind(&config.server_addr).await?;
        log_startup_info(&tcp.local_addr()?.to_string(), &config);
        serve_with_incoming(service, TcpListenerStream::new(tcp), signal).await
    }
}

/// Serves `service` on an already-bound connection stream.
///
/// When `signal` resolves, health flips to `NOT_SERVING`, the service drains
/// its in-flight calls, and the transport stops accepting connections.
pub async fn serve_with_incoming<I, IO, IE, F>(
    service: PersonService,
    incoming: I,
    signal: F,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
    F: Future<Output = ()> + Send,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<PersonRegistryServer<PersonService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let shutdown = {
        let service = service.clone();
        async move {
            signal.await;
            tracing::info!("Shutdown signal received, terminating gracefully...");
            health_reporter
                .set_not_serving::<PersonRegistryServer<PersonService>>()
                .await;
            service.shutdown().await;
        }
    };

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_registry_service(service))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn build_registry_service(service: PersonService) -> PersonRegistryServer<PersonService> {
    PersonRegistryServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

fn log_startup_info(addr: &str, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting person registry on {addr} with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting person registry on {addr} (pacing {:?}, seeded: {})",
            config.pacing_delay,
            config.seed
        );
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
