//! Read-only display layer.
//!
//! Licences and the page-content bindings are consumed by the rendering
//! layer only. They issue no writes and take no part in the draft/publish
//! protocol; bindings always target draft rows, where editors work.

use rkyv::{Archive, Deserialize, Serialize};
use sled::{Db, Tree};

use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionKind};
use crate::service::CatalogService;
use crate::store::ExtensionStore;

/// Tree name for licence rows.
const LICENCE_TREE: &str = "display:licences";

/// A licence attached to course content for display.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Licence {
    /// Licence name.
    pub name: String,
    /// Link to the licence text.
    pub url: String,
    /// Licence body shown inline.
    pub content: String,
    /// Opaque handle to the licence logo.
    pub logo: String,
}

impl Licence {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Storage for licences. Plain rows, no draft/public pairing.
pub struct LicenceStore {
    tree: Tree,
}

impl LicenceStore {
    /// Open or create the licence store from a sled database.
    pub fn open(db: &Db) -> Result<Self, Error> {
        let tree = db.open_tree(LICENCE_TREE)?;
        Ok(Self { tree })
    }

    /// Store a licence and return its id.
    pub fn create(&self, licence: &Licence) -> Result<ExtensionId, Error> {
        let id = ExtensionStore::generate_id();
        self.tree.insert(id, licence.to_bytes()?)?;
        Ok(id)
    }

    /// Get a licence by id.
    pub fn get(&self, id: &ExtensionId) -> Result<Option<Licence>, Error> {
        match self.tree.get(id)? {
            Some(bytes) => Ok(Some(Licence::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List all licences.
    pub fn list(&self) -> Result<Vec<(ExtensionId, Licence)>, Error> {
        let mut out = Vec::new();
        for result in self.tree.iter() {
            let (key, value) = result?;
            if key.len() != 16 {
                return Err(Error::InvalidKey);
            }
            let mut id = [0u8; 16];
            id.copy_from_slice(&key);
            out.push((id, Licence::from_bytes(&value)?));
        }
        Ok(out)
    }
}

/// Display fields of an organization embedded in page content.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationBinding {
    /// Page title of the organization.
    pub title: String,
    /// Organization code.
    pub code: Option<String>,
}

/// Display fields of a category embedded in page content.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBinding {
    /// Page title of the category.
    pub title: String,
}

/// A licence embedded in page content with a local description.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenceBinding {
    /// The bound licence.
    pub licence: Licence,
    /// Description specific to this placement.
    pub description: String,
}

/// Resolve the display binding for an organization draft.
pub fn organization_binding(
    catalog: &CatalogService,
    id: ExtensionId,
) -> Result<OrganizationBinding, Error> {
    let record = require_draft_of_kind(catalog, id, ExtensionKind::Organization)?;
    let code = record
        .data
        .as_organization()
        .and_then(|organization| organization.code.clone());
    Ok(OrganizationBinding {
        title: record.page.title,
        code,
    })
}

/// Resolve the display binding for a category draft.
pub fn category_binding(
    catalog: &CatalogService,
    id: ExtensionId,
) -> Result<CategoryBinding, Error> {
    let record = require_draft_of_kind(catalog, id, ExtensionKind::Category)?;
    Ok(CategoryBinding {
        title: record.page.title,
    })
}

/// Resolve the display binding for a licence.
pub fn licence_binding(
    licences: &LicenceStore,
    id: ExtensionId,
    description: impl Into<String>,
) -> Result<LicenceBinding, Error> {
    let licence = licences.get(&id)?.ok_or(Error::NotFound)?;
    Ok(LicenceBinding {
        licence,
        description: description.into(),
    })
}

fn require_draft_of_kind(
    catalog: &CatalogService,
    id: ExtensionId,
    kind: ExtensionKind,
) -> Result<crate::extension::ExtensionRecord, Error> {
    let record = catalog.get(id)?;
    if record.kind() != kind {
        return Err(Error::InvalidData(format!(
            "expected a {kind}, found a {}",
            record.kind()
        )));
    }
    // Bindings point at drafts; the page system renders the public side
    if !record.is_draft() {
        return Err(Error::NotDraft);
    }
    Ok(record)
}
