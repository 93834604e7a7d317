//! Store creation and persistence for the server.

use std::path::{Path, PathBuf};

use channeldb::backend::InMemory;

use crate::cli::ServeArgs;

const DATA_FILE: &str = "channeldb.json";

/// Location of the persisted store for `args`.
pub fn data_file(args: &ServeArgs) -> PathBuf {
    args.data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_FILE)
}

/// Loads the persisted store. A missing file starts an empty store.
///
/// A file that exists but cannot be loaded is an error: serving an empty
/// store would overwrite it on shutdown.
pub async fn create_store(path: &Path) -> Result<InMemory, Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    tracing::info!(
        "Using in-memory store with persistence at {}",
        path.display()
    );
    let store = InMemory::load_from_file(path).await.map_err(|e| {
        tracing::error!("Failed to load {}: {e}", path.display());
        format!("failed to load store from {}: {e}", path.display())
    })?;
    tracing::info!(keys = store.len().await, "Loaded existing data");
    Ok(store)
}
