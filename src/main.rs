use anyhow::{Context, Result};
use clap::Parser;
use practice_coach::{
    create_router, AppState, CaptureSourceFactory, ClientFactory, Config, FrameEncoder,
    SessionController, Synthesizer,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// Presentation practice coach
#[derive(Parser, Debug)]
#[command(name = "practice-coach")]
#[command(version)]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/practice-coach")]
    config: String,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("Practice Coach v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "Capture: {:?} at {}x{}",
        cfg.capture.source, cfg.capture.width, cfg.capture.height
    );

    let capture = CaptureSourceFactory::create(&cfg.capture)?;
    let clients = ClientFactory::connect(&cfg.clients).await?;
    let encoder = FrameEncoder::from_config(&cfg.capture);

    let controller = Arc::new(SessionController::new(
        cfg.session.clone(),
        encoder,
        capture.source,
        clients.classifier,
        clients.reporter,
        Synthesizer::new(cfg.report.clone()),
    ));

    let state = AppState::new(
        Arc::clone(&controller),
        capture.pusher,
        clients.similarity,
        encoder,
    );
    let app = create_router(state);

    let addr = cfg.listen_addr();
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    controller.dispose().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
