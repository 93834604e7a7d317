//! Serve command - runs the channeldb HTTP server.

use channeldb::{Channels, backend::InMemory, remote};
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::EnvFilter;

use crate::backend::{create_store, data_file};
use crate::cli::ServeArgs;

/// Run the channeldb server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("channeldb=info".parse()?))
        .init();

    let path = data_file(args);
    let store = create_store(&path).await?;
    let channels = Channels::open(Box::new(store));
    channels.on_event(|event: &channeldb::Event| {
        tracing::debug!(event = event.id(), timestamp = event.timestamp(), "Change");
    });

    if args.token.is_none() {
        tracing::warn!("No token configured; every request is accepted");
    }
    let app = remote::router(channels.clone(), args.token.clone());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("channeldb server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  POST /api/v0       - Channel operations (put, get, del, list)");
    println!("  GET  /health       - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    // Persist the store once the server has drained
    if let Some(store) = channels.backend().as_any().downcast_ref::<InMemory>() {
        match store.save_to_file(&path).await {
            Ok(()) => {
                tracing::info!("Store saved to {}", path.display());
                println!("\nStore saved successfully");
            }
            Err(e) => {
                tracing::error!("Failed to save store: {e:?}");
                eprintln!("Failed to save store: {e:?}");
            }
        }
    }

    println!("Server shut down");
    Ok(())
}
