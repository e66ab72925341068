// Dataset loader and per-process cache
use crate::application::dataset_store::DatasetStore;
use crate::domain::dataset::{Dataset, DatasetName};
use crate::domain::error::DashboardError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

#[derive(Debug)]
pub struct CacheEntry {
    pub dataset: Arc<Dataset>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub name: DatasetName,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Parsed datasets, populated on first access and kept until the process exits.
///
/// Lookups take a shared read lock. A miss takes the per-name gate so that
/// concurrent first requests for one dataset resolve to a single load; a
/// failed load leaves no entry behind and the next call retries.
pub struct DatasetCache {
    store: Arc<dyn DatasetStore>,
    entries: RwLock<HashMap<DatasetName, Arc<CacheEntry>>>,
    inflight: Mutex<HashMap<DatasetName, Arc<Mutex<()>>>>,
}

impl DatasetCache {
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Load a dataset by its document name (`"sales"`, `"marketing"`, ...)
    pub fn load(&self, name: &str) -> Result<Arc<Dataset>, DashboardError> {
        let name: DatasetName = name.parse()?;
        self.get(name)
    }

    pub fn get(&self, name: DatasetName) -> Result<Arc<Dataset>, DashboardError> {
        if let Some(entry) = self.entry(name) {
            tracing::debug!(dataset = %name, "dataset cache hit");
            return Ok(entry.dataset.clone());
        }

        let gate = self.gate(name);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the load while we waited
        if let Some(entry) = self.entry(name) {
            return Ok(entry.dataset.clone());
        }

        let started = Instant::now();
        let text = self.store.read_document(name).map_err(|source| {
            tracing::warn!(dataset = %name, store = %self.store.describe(), "dataset read failed: {}", source);
            DashboardError::Io {
                dataset: name,
                source,
            }
        })?;
        let dataset = Arc::new(Dataset::parse(name, &text).inspect_err(|e| {
            tracing::warn!(dataset = %name, "dataset rejected: {}", e);
        })?);

        let entry = Arc::new(CacheEntry {
            dataset: dataset.clone(),
            loaded_at: Utc::now(),
        });
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, entry);

        tracing::info!(
            dataset = %name,
            bytes = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn entry(&self, name: DatasetName) -> Option<Arc<CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .cloned()
    }

    /// One status row per known dataset, loaded or not
    pub fn status(&self) -> Vec<CacheStatus> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        DatasetName::ALL
            .into_iter()
            .map(|name| {
                let loaded_at = entries.get(&name).map(|e| e.loaded_at);
                CacheStatus {
                    name,
                    loaded: loaded_at.is_some(),
                    loaded_at,
                }
            })
            .collect()
    }

    fn gate(&self, name: DatasetName) -> Arc<Mutex<()>> {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .clone()
    }
}
