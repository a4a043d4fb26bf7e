//! Storage configuration.

use std::path::PathBuf;

const DEFAULT_CACHE_BYTES: u64 = 64 << 20;
const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

/// Configuration for the extension store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the database files.
    pub path: PathBuf,

    /// Page cache size in bytes.
    pub cache_capacity: u64,

    /// Background flush interval. `None` flushes on every write.
    pub flush_every_ms: Option<u64>,

    /// Compress stored values with zstd.
    pub compression: bool,

    /// Keep the database in a temp location and delete it on drop.
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./coursebook_data"),
            cache_capacity: DEFAULT_CACHE_BYTES,
            flush_every_ms: Some(DEFAULT_FLUSH_INTERVAL_MS),
            compression: true,
            temporary: false,
        }
    }
}

impl StoreConfig {
    /// Configuration rooted at the given directory, defaults elsewhere.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Throwaway database for tests, deleted when the store drops.
    pub fn temporary() -> Self {
        Self {
            path: PathBuf::new(),
            temporary: true,
            ..Default::default()
        }
    }

    pub(crate) fn to_sled_config(&self) -> sled::Config {
        let base = sled::Config::new()
            .cache_capacity(self.cache_capacity)
            .use_compression(self.compression)
            .flush_every_ms(self.flush_every_ms);

        if self.temporary {
            base.temporary(true)
        } else {
            base.path(&self.path)
        }
    }
}
