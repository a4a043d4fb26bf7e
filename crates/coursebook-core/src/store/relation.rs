//! Join-pair storage for multi-valued relations.
//!
//! Each pair is stored twice, once per direction, so membership can be
//! read and replaced from either side without a scan.

use sled::{Db, Tree};

use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionKind};

/// Tree name for owner -> member pairs.
const FORWARD_TREE: &str = "relations:forward";

/// Tree name for member -> owner pairs.
const REVERSE_TREE: &str = "relations:reverse";

/// The declared multi-valued relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Course -> Organization membership, owned by the course.
    CourseOrganizations,
    /// Course -> Subject membership, owned by the course.
    CourseSubjects,
}

impl RelationKind {
    /// Stable name, used in storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::CourseOrganizations => "course_organizations",
            RelationKind::CourseSubjects => "course_subjects",
        }
    }

    /// The extension kind on the owning side.
    pub fn owner_kind(&self) -> ExtensionKind {
        match self {
            RelationKind::CourseOrganizations | RelationKind::CourseSubjects => {
                ExtensionKind::Course
            }
        }
    }

    /// The extension kind on the member side.
    pub fn member_kind(&self) -> ExtensionKind {
        match self {
            RelationKind::CourseOrganizations => ExtensionKind::Organization,
            RelationKind::CourseSubjects => ExtensionKind::Subject,
        }
    }
}

/// Storage for relation membership pairs.
///
/// Key format: `relation\0owner_id(16)member_id(16)` in the forward tree,
/// `relation\0member_id(16)owner_id(16)` in the reverse tree. Values are
/// empty; presence of the key is the membership.
pub struct RelationStore {
    forward: Tree,
    reverse: Tree,
}

impl RelationStore {
    /// Open or create the relation store from a sled database.
    pub fn open(db: &Db) -> Result<Self, Error> {
        let forward = db.open_tree(FORWARD_TREE)?;
        let reverse = db.open_tree(REVERSE_TREE)?;
        Ok(Self { forward, reverse })
    }

    /// Add a membership pair. Idempotent.
    pub fn link(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        member: ExtensionId,
    ) -> Result<(), Error> {
        self.forward
            .insert(Self::pair_key(relation, &owner, &member), &[])?;
        self.reverse
            .insert(Self::pair_key(relation, &member, &owner), &[])?;
        Ok(())
    }

    /// Remove a membership pair. Idempotent.
    pub fn unlink(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        member: ExtensionId,
    ) -> Result<(), Error> {
        self.forward
            .remove(Self::pair_key(relation, &owner, &member))?;
        self.reverse
            .remove(Self::pair_key(relation, &member, &owner))?;
        Ok(())
    }

    /// Check whether a pair is present.
    pub fn contains(
        &self,
        relation: RelationKind,
        owner: &ExtensionId,
        member: &ExtensionId,
    ) -> Result<bool, Error> {
        Ok(self
            .forward
            .contains_key(Self::pair_key(relation, owner, member))?)
    }

    /// All members linked to an owner.
    pub fn members(
        &self,
        relation: RelationKind,
        owner: &ExtensionId,
    ) -> Result<Vec<ExtensionId>, Error> {
        Self::scan_side(&self.forward, relation, owner)
    }

    /// All owners linked to a member.
    pub fn owners(
        &self,
        relation: RelationKind,
        member: &ExtensionId,
    ) -> Result<Vec<ExtensionId>, Error> {
        Self::scan_side(&self.reverse, relation, member)
    }

    /// Replace an owner's membership with exactly the given set.
    ///
    /// Set-replace semantics: pairs absent from `members` are removed,
    /// missing ones are added. Not a union.
    pub fn set_members(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        members: &[ExtensionId],
    ) -> Result<(), Error> {
        for existing in self.members(relation, &owner)? {
            if !members.contains(&existing) {
                self.unlink(relation, owner, existing)?;
            }
        }
        for member in members {
            self.link(relation, owner, *member)?;
        }
        Ok(())
    }

    /// Replace a member's owner set with exactly the given set.
    ///
    /// The member-side mirror of [`set_members`](Self::set_members), used
    /// when a relation is synchronized from its inverse side.
    pub fn set_owners(
        &self,
        relation: RelationKind,
        member: ExtensionId,
        owners: &[ExtensionId],
    ) -> Result<(), Error> {
        for existing in self.owners(relation, &member)? {
            if !owners.contains(&existing) {
                self.unlink(relation, existing, member)?;
            }
        }
        for owner in owners {
            self.link(relation, *owner, member)?;
        }
        Ok(())
    }

    /// Remove every pair touching the given extension, on both sides of
    /// every relation. Used when an extension row is destroyed.
    pub fn scrub(&self, id: ExtensionId) -> Result<(), Error> {
        for relation in [
            RelationKind::CourseOrganizations,
            RelationKind::CourseSubjects,
        ] {
            self.set_members(relation, id, &[])?;
            self.set_owners(relation, id, &[])?;
        }
        Ok(())
    }

    /// Build the key for one direction of a pair.
    fn pair_key(relation: RelationKind, left: &ExtensionId, right: &ExtensionId) -> Vec<u8> {
        let relation = relation.as_str();
        let mut key = Vec::with_capacity(relation.len() + 1 + 32);
        key.extend_from_slice(relation.as_bytes());
        key.push(0); // Null separator
        key.extend_from_slice(left);
        key.extend_from_slice(right);
        key
    }

    /// Build the prefix for scanning one side of a relation.
    fn side_prefix(relation: RelationKind, id: &ExtensionId) -> Vec<u8> {
        let relation = relation.as_str();
        let mut prefix = Vec::with_capacity(relation.len() + 1 + 16);
        prefix.extend_from_slice(relation.as_bytes());
        prefix.push(0); // Null separator
        prefix.extend_from_slice(id);
        prefix
    }

    fn scan_side(
        tree: &Tree,
        relation: RelationKind,
        id: &ExtensionId,
    ) -> Result<Vec<ExtensionId>, Error> {
        let prefix = Self::side_prefix(relation, id);
        let prefix_len = prefix.len();

        let mut out = Vec::new();
        for result in tree.scan_prefix(&prefix) {
            let (key, _) = result?;
            if key.len() != prefix_len + 16 {
                return Err(Error::InvalidKey);
            }
            let mut other = [0u8; 16];
            other.copy_from_slice(&key[prefix_len..]);
            out.push(other);
        }
        Ok(out)
    }
}
