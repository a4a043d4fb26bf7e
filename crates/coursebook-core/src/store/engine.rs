//! Extension row storage.

use sled::{Db, Tree};

use super::StoreConfig;
use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionKind, ExtensionRecord};

/// Tree name for extension rows.
const DATA_TREE: &str = "extensions:data";

/// Tree name for the extension kind index.
const KIND_INDEX_TREE: &str = "index:kind";

/// Row storage for extensions, keyed by extension id.
///
/// Rows are stored latest-only: the draft/publish pairing is the only
/// versioning discipline in this domain, carried in the rows themselves.
pub struct ExtensionStore {
    /// The underlying sled database.
    db: Db,

    /// Tree for extension rows.
    data_tree: Tree,

    /// Tree for the kind index (kind + extension_id -> empty).
    kind_tree: Tree,
}

impl ExtensionStore {
    /// Open or create a store with the given configuration.
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let sled_config = config.to_sled_config();
        let db = sled_config.open()?;
        let data_tree = db.open_tree(DATA_TREE)?;
        let kind_tree = db.open_tree(KIND_INDEX_TREE)?;

        Ok(Self {
            db,
            data_tree,
            kind_tree,
        })
    }

    /// Insert or overwrite an extension row.
    pub fn put(&self, id: ExtensionId, record: &ExtensionRecord) -> Result<(), Error> {
        let value = record.to_bytes()?;
        self.data_tree.insert(id, value)?;

        let index_key = Self::kind_index_key(record.kind(), &id);
        self.kind_tree.insert(index_key, &[])?;

        Ok(())
    }

    /// Get an extension row by id.
    pub fn get(&self, id: &ExtensionId) -> Result<Option<ExtensionRecord>, Error> {
        match self.data_tree.get(id)? {
            Some(bytes) => Ok(Some(ExtensionRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Check whether an extension row exists.
    pub fn contains(&self, id: &ExtensionId) -> Result<bool, Error> {
        Ok(self.data_tree.contains_key(id)?)
    }

    /// Remove an extension row and its kind index entry.
    ///
    /// Returns the removed record, if any. Relation rows and unique claims
    /// are scrubbed by the caller.
    pub fn remove(&self, id: &ExtensionId) -> Result<Option<ExtensionRecord>, Error> {
        let removed = match self.data_tree.remove(id)? {
            Some(bytes) => Some(ExtensionRecord::from_bytes(&bytes)?),
            None => None,
        };

        if let Some(record) = &removed {
            let index_key = Self::kind_index_key(record.kind(), id);
            self.kind_tree.remove(index_key)?;
        }

        Ok(removed)
    }

    /// Scan all extensions of a given kind.
    pub fn scan_kind(
        &self,
        kind: ExtensionKind,
    ) -> impl Iterator<Item = Result<(ExtensionId, ExtensionRecord), Error>> + '_ {
        let prefix = Self::kind_index_prefix(kind);
        let prefix_len = prefix.len();

        self.kind_tree
            .scan_prefix(&prefix)
            .filter_map(move |result| match result {
                Ok((key, _)) => {
                    if key.len() != prefix_len + 16 {
                        return Some(Err(Error::InvalidKey));
                    }
                    let mut id = [0u8; 16];
                    id.copy_from_slice(&key[prefix_len..]);

                    match self.get(&id) {
                        Ok(Some(record)) => Some(Ok((id, record))),
                        Ok(None) => None, // Stale index entry
                        Err(e) => Some(Err(e)),
                    }
                }
                Err(e) => Some(Err(e.into())),
            })
    }

    /// Generate a new extension id.
    ///
    /// Nanosecond timestamp in the high half, a process-wide sequence
    /// number in the low half, with the RFC 4122 version and variant bits
    /// stamped on top so the bytes read as a UUID v4.
    pub fn generate_id() -> ExtensionId {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static SEQUENCE: AtomicU64 = AtomicU64::new(0);

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_nanos() as u64;
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

        let mut id = [0u8; 16];
        id[..8].copy_from_slice(&nanos.to_be_bytes());
        id[8..].copy_from_slice(&seq.to_be_bytes());
        id[6] = (id[6] & 0x0f) | 0x40;
        id[8] = (id[8] & 0x3f) | 0x80;
        id
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Get the underlying sled database (for opening new trees).
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Get the index key for a kind + extension id.
    fn kind_index_key(kind: ExtensionKind, id: &ExtensionId) -> Vec<u8> {
        let kind = kind.as_str();
        let mut key = Vec::with_capacity(kind.len() + 1 + 16);
        key.extend_from_slice(kind.as_bytes());
        key.push(0); // Null separator
        key.extend_from_slice(id);
        key
    }

    /// Get the prefix for scanning all extensions of a kind.
    fn kind_index_prefix(kind: ExtensionKind) -> Vec<u8> {
        let kind = kind.as_str();
        let mut prefix = Vec::with_capacity(kind.len() + 1);
        prefix.extend_from_slice(kind.as_bytes());
        prefix.push(0); // Null separator
        prefix
    }
}
