//! One-to-one page ownership claims.
//!
//! A page carries at most one extension. The claim is installed with
//! compare-and-swap, the same discipline as the business-key index, and
//! released when the extension row is destroyed.

use sled::{Db, Tree};

use crate::error::Error;
use crate::extension::ExtensionId;

/// Tree name for page ownership claims.
const PAGE_INDEX_TREE: &str = "index:page";

/// Index mapping a page id to the single extension attached to it.
pub struct PageIndex {
    tree: Tree,
}

impl PageIndex {
    /// Open or create the page index from a sled database.
    pub fn open(db: &Db) -> Result<Self, Error> {
        let tree = db.open_tree(PAGE_INDEX_TREE)?;
        Ok(Self { tree })
    }

    /// The extension currently attached to a page.
    pub fn holder(&self, page: &ExtensionId) -> Result<Option<ExtensionId>, Error> {
        match self.tree.get(page)? {
            Some(bytes) if bytes.len() == 16 => {
                let mut id = [0u8; 16];
                id.copy_from_slice(&bytes);
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    /// Attach an extension to a page.
    ///
    /// Claiming a page already held by the same extension is a no-op; a
    /// page held by any other extension is rejected.
    pub fn claim(&self, page: ExtensionId, extension: ExtensionId) -> Result<(), Error> {
        loop {
            let current = self.tree.get(&page)?;

            if let Some(existing) = current.as_deref() {
                if existing != &extension[..] {
                    return Err(Error::PageAlreadyExtended);
                }
                return Ok(());
            }

            match self
                .tree
                .compare_and_swap(&page, current, Some(&extension[..]))?
            {
                Ok(()) => return Ok(()),
                Err(_) => continue, // Lost the race, re-read and re-check
            }
        }
    }

    /// Detach an extension from a page, if it is the holder.
    pub fn release(&self, page: &ExtensionId, extension: ExtensionId) -> Result<(), Error> {
        if let Some(existing) = self.tree.get(page)? {
            if existing.as_ref() == &extension[..] {
                self.tree.remove(page)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> PageIndex {
        let db = sled::Config::new().temporary(true).open().unwrap();
        PageIndex::open(&db).unwrap()
    }

    #[test]
    fn test_claim_and_holder() {
        let index = test_index();
        index.claim([1u8; 16], [10u8; 16]).unwrap();
        assert_eq!(index.holder(&[1u8; 16]).unwrap(), Some([10u8; 16]));
    }

    #[test]
    fn test_second_claim_rejected() {
        let index = test_index();
        index.claim([1u8; 16], [10u8; 16]).unwrap();
        assert!(matches!(
            index.claim([1u8; 16], [11u8; 16]),
            Err(Error::PageAlreadyExtended)
        ));
    }

    #[test]
    fn test_reclaim_by_holder_is_allowed() {
        let index = test_index();
        index.claim([1u8; 16], [10u8; 16]).unwrap();
        index.claim([1u8; 16], [10u8; 16]).unwrap();
    }

    #[test]
    fn test_release_only_by_holder() {
        let index = test_index();
        index.claim([1u8; 16], [10u8; 16]).unwrap();

        index.release(&[1u8; 16], [11u8; 16]).unwrap();
        assert_eq!(index.holder(&[1u8; 16]).unwrap(), Some([10u8; 16]));

        index.release(&[1u8; 16], [10u8; 16]).unwrap();
        assert_eq!(index.holder(&[1u8; 16]).unwrap(), None);

        // Page is free again
        index.claim([1u8; 16], [11u8; 16]).unwrap();
    }
}
