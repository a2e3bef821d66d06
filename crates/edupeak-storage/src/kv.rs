use async_trait::async_trait;
use edupeak_core::config::{AppConfig, StorageBackend};
use edupeak_core::error::StorageError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Durable string key-value storage. The session store only needs whole-value
/// reads and writes; there is no partial update or transaction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store, used for `--storage memory` and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Io(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Opens the backend selected in `config.storage`.
pub async fn open_backend(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryKvStore::new()),
        StorageBackend::File => Arc::new(crate::FileKvStore::open(config.data_path()).await?),
        StorageBackend::Sqlite => {
            let db = crate::Database::open(config).await?;
            db.run_migrations().await?;
            Arc::new(db)
        }
    };
    tracing::debug!(backend = ?config.storage.backend, "opened session storage");
    Ok(store)
}
