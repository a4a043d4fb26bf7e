//! Secondary index for partition-scoped business-key uniqueness.
//!
//! Pages exist in two versions, draft and public, so a plain unique index
//! would be wrong: a draft and its published copy may legitimately carry
//! the same key value. The index therefore scopes every claim to a version
//! partition, and uniqueness holds within each partition independently.

use sled::{Db, Tree};

use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionKind};

/// Tree name for the scoped unique index.
const UNIQUE_INDEX_TREE: &str = "index:unique";

/// The version partition a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// The pool of editable draft rows.
    Draft,
    /// The pool of published public rows.
    Public,
}

impl Partition {
    /// Partition of a row with the given draft flag.
    pub fn of(is_draft: bool) -> Self {
        if is_draft {
            Partition::Draft
        } else {
            Partition::Public
        }
    }

    /// Stable name, used in index keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Draft => "draft",
            Partition::Public => "public",
        }
    }
}

/// Secondary index mapping (kind, field, partition, value) to the
/// extension id holding that value.
///
/// Key format: `kind\0field\0partition\0value` -> `extension_id`
pub struct ScopedUniqueIndex {
    tree: Tree,
}

impl ScopedUniqueIndex {
    /// Open or create the unique index from a sled database.
    pub fn open(db: &Db) -> Result<Self, Error> {
        let tree = db.open_tree(UNIQUE_INDEX_TREE)?;
        Ok(Self { tree })
    }

    /// Build the index key for a business-key claim.
    fn build_key(kind: ExtensionKind, field: &str, partition: Partition, value: &str) -> Vec<u8> {
        let mut key = Vec::new();
        key.extend_from_slice(kind.as_str().as_bytes());
        key.push(0);
        key.extend_from_slice(field.as_bytes());
        key.push(0);
        key.extend_from_slice(partition.as_str().as_bytes());
        key.push(0);
        key.extend_from_slice(value.as_bytes());
        key
    }

    /// Look up the extension currently holding a value.
    pub fn lookup(
        &self,
        kind: ExtensionKind,
        field: &str,
        partition: Partition,
        value: &str,
    ) -> Result<Option<ExtensionId>, Error> {
        let key = Self::build_key(kind, field, partition, value);

        match self.tree.get(&key)? {
            Some(bytes) if bytes.len() == 16 => {
                let mut id = [0u8; 16];
                id.copy_from_slice(&bytes);
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    /// Check whether a value is available within a partition.
    ///
    /// A value held by `entity_id` itself is available (re-saving an
    /// unchanged row must pass).
    pub fn check(
        &self,
        kind: ExtensionKind,
        field: &str,
        partition: Partition,
        value: &str,
        entity_id: ExtensionId,
    ) -> Result<bool, Error> {
        match self.lookup(kind, field, partition, value)? {
            Some(existing) => Ok(existing == entity_id),
            None => Ok(true),
        }
    }

    /// Claim a value for an extension within a partition.
    ///
    /// The claim is installed with compare-and-swap so two concurrent
    /// writers cannot both pass the availability check. Claiming a value
    /// already held by the same extension is a no-op.
    pub fn claim(
        &self,
        kind: ExtensionKind,
        field: &str,
        partition: Partition,
        value: &str,
        entity_id: ExtensionId,
    ) -> Result<(), Error> {
        let key = Self::build_key(kind, field, partition, value);

        loop {
            let current = self.tree.get(&key)?;

            if let Some(existing) = current.as_deref() {
                if existing != &entity_id[..] {
                    return Err(Error::DuplicateKey {
                        entity: kind.as_str().to_string(),
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
                return Ok(());
            }

            match self
                .tree
                .compare_and_swap(&key, current, Some(&entity_id[..]))?
            {
                Ok(()) => return Ok(()),
                Err(_) => continue, // Lost the race, re-read and re-check
            }
        }
    }

    /// Release a claim, if held by the given extension.
    pub fn release(
        &self,
        kind: ExtensionKind,
        field: &str,
        partition: Partition,
        value: &str,
        entity_id: ExtensionId,
    ) -> Result<(), Error> {
        let key = Self::build_key(kind, field, partition, value);

        if let Some(existing) = self.tree.get(&key)? {
            if existing.as_ref() == &entity_id[..] {
                self.tree.remove(key)?;
            }
        }
        Ok(())
    }

    /// Get the number of claims in the index.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> ScopedUniqueIndex {
        let db = sled::Config::new().temporary(true).open().unwrap();
        ScopedUniqueIndex::open(&db).unwrap()
    }

    #[test]
    fn test_claim_and_lookup() {
        let index = test_index();
        let id = [1u8; 16];

        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap();

        let holder = index
            .lookup(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
            )
            .unwrap();
        assert_eq!(holder, Some(id));
    }

    #[test]
    fn test_duplicate_claim_fails() {
        let index = test_index();

        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [1u8; 16],
            )
            .unwrap();

        let result = index.claim(
            ExtensionKind::Course,
            "active_session",
            Partition::Draft,
            "eco-101",
            [2u8; 16],
        );

        match result {
            Err(Error::DuplicateKey { entity, field, value }) => {
                assert_eq!(entity, "course");
                assert_eq!(field, "active_session");
                assert_eq!(value, "eco-101");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_reclaim_by_same_entity_is_allowed() {
        let index = test_index();
        let id = [1u8; 16];

        for _ in 0..2 {
            index
                .claim(
                    ExtensionKind::Course,
                    "active_session",
                    Partition::Draft,
                    "eco-101",
                    id,
                )
                .unwrap();
        }
    }

    #[test]
    fn test_partitions_are_independent() {
        let index = test_index();

        // A draft and a public row may carry the same value
        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [1u8; 16],
            )
            .unwrap();
        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Public,
                "eco-101",
                [2u8; 16],
            )
            .unwrap();
    }

    #[test]
    fn test_release() {
        let index = test_index();
        let id = [1u8; 16];

        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap();
        index
            .release(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap();

        // Value is free again
        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [2u8; 16],
            )
            .unwrap();
    }

    #[test]
    fn test_release_by_other_entity_is_ignored() {
        let index = test_index();

        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [1u8; 16],
            )
            .unwrap();
        index
            .release(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [2u8; 16],
            )
            .unwrap();

        let holder = index
            .lookup(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
            )
            .unwrap();
        assert_eq!(holder, Some([1u8; 16]));
    }

    #[test]
    fn test_check() {
        let index = test_index();
        let id = [1u8; 16];

        assert!(index
            .check(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap());

        index
            .claim(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap();

        // Held by self: still available
        assert!(index
            .check(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                id,
            )
            .unwrap());

        // Held by someone else: taken
        assert!(!index
            .check(
                ExtensionKind::Course,
                "active_session",
                Partition::Draft,
                "eco-101",
                [2u8; 16],
            )
            .unwrap());
    }
}
