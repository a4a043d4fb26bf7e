//! Reference to a page in the external page system.

use rkyv::{Archive, Deserialize, Serialize};

use crate::extension::ExtensionId;

/// A read-only snapshot of the page an extension is attached to.
///
/// The page system owns hierarchy, routing and rendering; this core only
/// reads the page identity, its draft flag and its title. An extension is
/// draft iff its page is draft; it carries no independent flag.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct PageRef {
    /// Page identifier, opaque to this core.
    pub id: ExtensionId,
    /// Whether the page is the editable draft version.
    pub is_draft: bool,
    /// Human-readable page title, used for display only.
    pub title: String,
}

impl PageRef {
    /// Create a reference to a draft page.
    pub fn draft(id: ExtensionId, title: impl Into<String>) -> Self {
        Self {
            id,
            is_draft: true,
            title: title.into(),
        }
    }

    /// Create a reference to a public page.
    pub fn public(id: ExtensionId, title: impl Into<String>) -> Self {
        Self {
            id,
            is_draft: false,
            title: title.into(),
        }
    }
}
