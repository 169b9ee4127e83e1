//! Per-city dataset cache for the interactive runtime.
//!
//! Restarting the analysis with the same city reuses the parsed dataset
//! instead of re-reading the CSV. An entry is dropped when the file's
//! modification time changes, so an updated export is picked up on the next
//! pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use bikeshare_core::error::Result;
use bikeshare_core::models::{City, Dataset};
use bikeshare_data::reader::{city_path, load_dataset};

struct CachedDataset {
    dataset: Arc<Dataset>,
    /// File mtime when the entry was loaded.
    modified: Option<SystemTime>,
}

/// Lazily loads and caches one [`Dataset`] per city.
pub struct DataManager {
    data_dir: PathBuf,
    cache: HashMap<City, CachedDataset>,
}

impl DataManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Return `city`'s dataset, loading it on first use or when the file
    /// changed since it was cached.
    pub fn get(&mut self, city: City) -> Result<Arc<Dataset>> {
        let path = city_path(&self.data_dir, city);
        let modified = modified_time(&path);

        if let Some(entry) = self.cache.get(&city) {
            if entry.modified.is_some() && entry.modified == modified {
                tracing::debug!(city = city.name(), "returning cached dataset");
                return Ok(Arc::clone(&entry.dataset));
            }
            tracing::debug!(city = city.name(), "cached dataset is stale");
        }

        match load_dataset(&path, city) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.cache.insert(
                    city,
                    CachedDataset {
                        dataset: Arc::clone(&dataset),
                        modified,
                    },
                );
                Ok(dataset)
            }
            Err(e) => {
                tracing::warn!(city = city.name(), error = %e, "dataset load failed");
                self.cache.remove(&city);
                Err(e)
            }
        }
    }

    pub fn is_cached(&self, city: City) -> bool {
        self.cache.contains_key(&city)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
