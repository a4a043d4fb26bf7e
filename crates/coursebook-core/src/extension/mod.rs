//! Versioned page extensions.
//!
//! Every catalog entity is an extension attached one-to-one to a page and
//! exists as one draft row and, once published, one paired public row.

mod data;
mod record;

pub use data::{
    CourseData, CourseRunData, ExtensionData, ExtensionKind, OrganizationData,
};
pub use record::{current_timestamp, ExtensionRecord};

/// Extension identifier (UUID bytes).
pub type ExtensionId = [u8; 16];
