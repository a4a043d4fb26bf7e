//! Declarative rules dispatched by the generic publish and save tooling.
//!
//! Rules are enum variants rather than open closures, so the registry is
//! a closed dispatch table that can be inspected and tested.

use crate::extension::{ExtensionData, ExtensionId};
use crate::store::RelationKind;

/// A business key whose value must be unique within its version partition.
///
/// Keys are only checked when non-empty; rows without a value are exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessKey {
    /// `Course.active_session`: the course key of the active session.
    CourseActiveSession,
}

impl BusinessKey {
    /// The field name, for index keys and error attribution.
    pub fn field(&self) -> &'static str {
        match self {
            BusinessKey::CourseActiveSession => "active_session",
        }
    }

    /// Read the key value off a payload. Empty strings count as absent.
    pub fn value<'a>(&self, data: &'a ExtensionData) -> Option<&'a str> {
        match self {
            BusinessKey::CourseActiveSession => data
                .as_course()
                .and_then(|course| course.active_session.as_deref())
                .filter(|value| !value.is_empty()),
        }
    }
}

/// How a relation is copied from a draft to its public counterpart at
/// publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRule {
    /// Copy owner-side membership: the public row receives the draft
    /// row's member set.
    Forward(RelationKind),
    /// Copy member-side membership: the public row receives the draft
    /// row's owner set. Used when the entity sits on the inverse side of
    /// a relation it does not own.
    Inverse(RelationKind),
}

impl SyncRule {
    /// The relation this rule copies.
    pub fn relation(&self) -> RelationKind {
        match self {
            SyncRule::Forward(relation) | SyncRule::Inverse(relation) => *relation,
        }
    }
}

/// A post-write correction rule. Each rule is idempotent and safe to
/// re-run on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantRule {
    /// The designated primary member must be an element of the broader
    /// relation. If absent it is added, never rejected.
    PrimaryMemberOf(RelationKind),
}

impl InvariantRule {
    /// The primary member designated by a payload, if any.
    pub fn primary_member(&self, data: &ExtensionData) -> Option<ExtensionId> {
        match self {
            InvariantRule::PrimaryMemberOf(_) => {
                data.as_course().and_then(|course| course.main_organization)
            }
        }
    }

    /// Null out the primary-member pointer on a payload.
    ///
    /// Used when the referenced row is destroyed; relation pairs are
    /// scrubbed separately.
    pub fn clear_primary(&self, data: &mut ExtensionData) {
        match self {
            InvariantRule::PrimaryMemberOf(_) => {
                if let ExtensionData::Course(course) = data {
                    course.main_organization = None;
                }
            }
        }
    }
}
