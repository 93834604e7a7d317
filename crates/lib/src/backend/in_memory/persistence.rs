//! Persistence operations for the InMemory store
//!
//! The whole key space is written as one JSON document. Keys are stored in
//! their raw storage-key form so a loaded store lists identically.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::InMemory;
use crate::backend::BackendError;
use crate::clock::SystemClock;

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

#[derive(Serialize, Deserialize)]
struct SerializableStore {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    entries: BTreeMap<String, Value>,
}

pub(super) async fn save_to_file<P: AsRef<Path>>(
    store: &InMemory,
    path: P,
) -> Result<(), BackendError> {
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        entries: store.entries.read().await.clone(),
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|source| BackendError::SerializationFailed { source })?;
    tokio::fs::write(path.as_ref(), json)
        .await
        .map_err(|source| BackendError::FileIo { source })?;
    tracing::debug!(
        path = %path.as_ref().display(),
        keys = serializable.entries.len(),
        "Saved in-memory store"
    );
    Ok(())
}

pub(super) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory, BackendError> {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(json) => {
            let serializable: SerializableStore = serde_json::from_str(&json)
                .map_err(|source| BackendError::DeserializationFailed { source })?;
            Ok(InMemory::from_entries(
                serializable.entries,
                Arc::new(SystemClock),
            ))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(source) => Err(BackendError::FileIo { source }),
    }
}
