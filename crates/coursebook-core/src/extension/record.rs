//! Stored extension rows.

use rkyv::{Archive, Deserialize, Serialize};

use super::{ExtensionData, ExtensionId, ExtensionKind};
use crate::error::Error;
use crate::page::PageRef;

/// A stored extension row: the page binding, the optional link to the
/// public sibling, and the kind-specific payload.
///
/// The counterpart link is asymmetric: only a draft row ever points to its
/// public copy. The reverse direction is a lookup, never a stored pointer.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct ExtensionRecord {
    /// The page this extension is attached to.
    pub page: PageRef,

    /// The public sibling row, present only on a draft that has been
    /// published at least once.
    pub public_counterpart: Option<ExtensionId>,

    /// Kind-specific structured fields.
    pub data: ExtensionData,

    /// Creation timestamp in microseconds since Unix epoch.
    pub created_at: u64,
}

impl ExtensionRecord {
    /// Create a new record with the current timestamp.
    pub fn new(page: PageRef, data: ExtensionData) -> Self {
        Self {
            page,
            public_counterpart: None,
            data,
            created_at: current_timestamp(),
        }
    }

    /// The extension kind, read off the payload tag.
    pub fn kind(&self) -> ExtensionKind {
        self.data.kind()
    }

    /// True iff the owning page is the draft version.
    pub fn is_draft(&self) -> bool {
        self.page.is_draft
    }

    /// The public sibling, if this draft has been published.
    pub fn public_counterpart(&self) -> Option<ExtensionId> {
        self.public_counterpart
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_micros() as u64
}
