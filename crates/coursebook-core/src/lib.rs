//! Coursebook core - the draft/publish consistency layer of the catalog.
//!
//! Every catalog entity (course, subject, organization, category, course
//! run) is an extension attached one-to-one to a page owned by an external
//! page system. Each logical entity exists as one draft row and, once
//! published, one paired public row. Edits always happen on the draft;
//! publishing materializes a public snapshot, re-synchronizes the
//! multi-valued relations, and refreshes the draft's counterpart pointer.
//! Business-key uniqueness is evaluated per version partition so a draft
//! and its published copy may share a value while two drafts may not.

pub mod catalog;
pub mod constraint;
pub mod display;
pub mod error;
pub mod extension;
pub mod invariant;
pub mod page;
pub mod publish;
pub mod service;
pub mod store;

pub use catalog::{BusinessKey, ExtensionRegistry, ExtensionSpec, InvariantRule, SyncRule};
pub use constraint::UniquenessValidator;
pub use display::{
    category_binding, licence_binding, organization_binding, CategoryBinding, Licence,
    LicenceBinding, LicenceStore, OrganizationBinding,
};
pub use error::Error;
pub use extension::{
    CourseData, CourseRunData, ExtensionData, ExtensionId, ExtensionKind, ExtensionRecord,
    OrganizationData,
};
pub use invariant::InvariantEnforcer;
pub use page::PageRef;
pub use publish::RelationSynchronizer;
pub use service::CatalogService;
pub use store::{
    ExtensionStore, PageIndex, Partition, RelationKind, RelationStore, ScopedUniqueIndex,
    StoreConfig,
};
