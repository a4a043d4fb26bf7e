//! The catalog service: composition root for the draft/publish protocol.
//!
//! Every operation an outer surface would call goes through here, with
//! the same sequencing everywhere: uniqueness validation scoped to the
//! candidate's partition, then the row write, then invariant enforcement.
//! Mutations are only accepted on drafts; a public row changes only
//! through an explicit publish.

use tracing::debug;

use crate::catalog::{ExtensionRegistry, InvariantRule};
use crate::constraint::UniquenessValidator;
use crate::error::Error;
use crate::extension::{
    current_timestamp, ExtensionData, ExtensionId, ExtensionKind, ExtensionRecord,
};
use crate::invariant::InvariantEnforcer;
use crate::page::PageRef;
use crate::publish::RelationSynchronizer;
use crate::store::{
    ExtensionStore, PageIndex, RelationKind, RelationStore, ScopedUniqueIndex, StoreConfig,
};

/// The catalog service.
pub struct CatalogService {
    store: ExtensionStore,
    relations: RelationStore,
    unique: ScopedUniqueIndex,
    pages: PageIndex,
    registry: ExtensionRegistry,
}

impl CatalogService {
    /// Open a catalog with the built-in registry.
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        Self::with_registry(config, ExtensionRegistry::builtin())
    }

    /// Open a catalog with a custom registry.
    pub fn with_registry(config: StoreConfig, registry: ExtensionRegistry) -> Result<Self, Error> {
        let store = ExtensionStore::open(config)?;
        let relations = RelationStore::open(store.db())?;
        let unique = ScopedUniqueIndex::open(store.db())?;
        let pages = PageIndex::open(store.db())?;

        Ok(Self {
            store,
            relations,
            unique,
            pages,
            registry,
        })
    }

    /// The registry driving this catalog.
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// The underlying extension store.
    pub fn store(&self) -> &ExtensionStore {
        &self.store
    }

    /// The underlying relation store.
    pub fn relations(&self) -> &RelationStore {
        &self.relations
    }

    /// Get an extension row by id.
    pub fn get(&self, id: ExtensionId) -> Result<ExtensionRecord, Error> {
        self.store.get(&id)?.ok_or(Error::NotFound)
    }

    /// Validate a candidate without writing anything.
    pub fn validate(&self, id: ExtensionId, candidate: &ExtensionRecord) -> Result<(), Error> {
        self.validator().validate(id, candidate)
    }

    /// Create a draft extension attached to a draft page.
    ///
    /// A page carries at most one extension; the attachment is claimed
    /// before anything else commits. No public counterpart exists until
    /// the draft is published. A failure after the claim phase rolls the
    /// claims back, so a rejected create leaves nothing behind.
    pub fn create_draft(&self, page: PageRef, data: ExtensionData) -> Result<ExtensionId, Error> {
        if !page.is_draft {
            return Err(Error::NotDraft);
        }
        let kind = data.kind();
        if !self.registry.is_registered(kind) {
            return Err(Error::InvalidData(format!(
                "extension kind {kind} is not registered"
            )));
        }

        let id = ExtensionStore::generate_id();
        let record = ExtensionRecord::new(page, data);

        self.pages.claim(record.page.id, id)?;
        if let Err(err) = self.validator().claim(id, None, &record) {
            let _ = self.pages.release(&record.page.id, id);
            return Err(err);
        }
        if let Err(err) = self
            .store
            .put(id, &record)
            .and_then(|_| self.enforcer().enforce(id, &record))
        {
            let _ = self.store.remove(&id);
            let _ = self.validator().release(id, &record);
            let _ = self.pages.release(&record.page.id, id);
            return Err(err);
        }

        debug!(entity = %kind, "created draft extension");
        Ok(id)
    }

    /// Save new payload data on a draft.
    ///
    /// Never touches the public counterpart; saving is never implicitly a
    /// publish. A failed commit restores the previous row and its claims.
    pub fn save_draft(&self, id: ExtensionId, data: ExtensionData) -> Result<(), Error> {
        let previous = self.get(id)?;
        if !previous.is_draft() {
            return Err(Error::NotDraft);
        }
        if data.kind() != previous.kind() {
            return Err(Error::InvalidData(format!(
                "cannot change extension kind from {} to {}",
                previous.kind(),
                data.kind()
            )));
        }

        let mut record = previous.clone();
        record.data = data;

        self.validator().claim(id, Some(&previous), &record)?;
        if let Err(err) = self
            .store
            .put(id, &record)
            .and_then(|_| self.enforcer().enforce(id, &record))
        {
            let _ = self.store.put(id, &previous);
            let _ = self.validator().claim(id, Some(&record), &previous);
            return Err(err);
        }

        debug!(entity = %record.kind(), "saved draft extension");
        Ok(())
    }

    /// Add a member to a relation on a draft owner.
    ///
    /// Both endpoints must match the relation's declared kinds.
    pub fn link(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        member: ExtensionId,
    ) -> Result<(), Error> {
        let record = self.require_draft(owner)?;
        self.check_relation_kinds(relation, &record, &[member])?;
        self.relations.link(relation, owner, member)
    }

    /// Remove a member from a relation on a draft owner.
    ///
    /// Invariants are re-enforced afterwards: removing the main
    /// organization from a course's organizations self-heals.
    pub fn unlink(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        member: ExtensionId,
    ) -> Result<(), Error> {
        let record = self.require_draft(owner)?;
        self.relations.unlink(relation, owner, member)?;
        self.enforcer().enforce(owner, &record)
    }

    /// Replace a relation's membership on a draft owner.
    pub fn set_relation(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
        members: &[ExtensionId],
    ) -> Result<(), Error> {
        let record = self.require_draft(owner)?;
        self.check_relation_kinds(relation, &record, members)?;
        self.relations.set_members(relation, owner, members)?;
        self.enforcer().enforce(owner, &record)
    }

    /// Read a relation's membership.
    pub fn members(
        &self,
        relation: RelationKind,
        owner: ExtensionId,
    ) -> Result<Vec<ExtensionId>, Error> {
        self.relations.members(relation, &owner)
    }

    /// Read the owners linked to a member.
    pub fn owners(
        &self,
        relation: RelationKind,
        member: ExtensionId,
    ) -> Result<Vec<ExtensionId>, Error> {
        self.relations.owners(relation, &member)
    }

    /// Publish a draft: materialize its public snapshot.
    ///
    /// Upserts the public row with copied scalar fields, synchronizes the
    /// declared relations, then refreshes the draft's counterpart pointer.
    /// The public page reference comes from the caller because the page
    /// system owns page publication. Re-publishing reuses the stored
    /// counterpart id, which makes the operation idempotent and lets the
    /// public-side uniqueness check exclude the row itself.
    pub fn publish(&self, draft_id: ExtensionId, public_page: PageRef) -> Result<ExtensionId, Error> {
        let mut draft = self.get(draft_id)?;
        if !draft.is_draft() {
            return Err(Error::NotDraft);
        }
        if public_page.is_draft {
            return Err(Error::NotPublicPage);
        }
        let kind = draft.kind();

        let existing = draft.public_counterpart();
        let public_id = existing.unwrap_or_else(ExtensionStore::generate_id);
        let previous_public = match existing {
            Some(pid) => self.store.get(&pid)?,
            None => None,
        };
        let previous_page = previous_public.as_ref().map(|record| record.page.id);

        let public_record = ExtensionRecord {
            page: public_page,
            public_counterpart: None,
            data: draft.data.clone(),
            created_at: previous_public
                .as_ref()
                .map(|record| record.created_at)
                .unwrap_or_else(current_timestamp),
        };

        self.pages.claim(public_record.page.id, public_id)?;
        let page_moved = previous_page != Some(public_record.page.id);
        if let Err(err) = self
            .validator()
            .claim(public_id, previous_public.as_ref(), &public_record)
        {
            if page_moved {
                let _ = self.pages.release(&public_record.page.id, public_id);
            }
            return Err(err);
        }

        let committed = (|| -> Result<(), Error> {
            // The public row must exist before relations are copied onto it
            self.store.put(public_id, &public_record)?;
            self.synchronizer()
                .sync(&self.store, kind, draft_id, public_id)?;

            if draft.public_counterpart != Some(public_id) {
                draft.public_counterpart = Some(public_id);
                self.store.put(draft_id, &draft)?;
            }

            self.enforcer().enforce(public_id, &public_record)
        })();
        if let Err(err) = committed {
            match previous_public.as_ref() {
                Some(previous) => {
                    let _ = self.store.put(public_id, previous);
                    let _ = self.validator().claim(public_id, Some(&public_record), previous);
                }
                None => {
                    let _ = self.store.remove(&public_id);
                    let _ = self.validator().release(public_id, &public_record);
                }
            }
            if page_moved {
                let _ = self.pages.release(&public_record.page.id, public_id);
            }
            return Err(err);
        }

        // Retire the previous public page claim if the page changed
        if let Some(old_page) = previous_page {
            if page_moved {
                self.pages.release(&old_page, public_id)?;
            }
        }

        debug!(entity = %kind, "published draft extension");
        Ok(public_id)
    }

    /// Destroy a draft and, by cascade, its public counterpart.
    ///
    /// The public row exists only to mirror the draft, so it never
    /// outlives it. Unique claims, page claims and relation pairs of both
    /// rows are scrubbed, and primary-member pointers that referenced the
    /// destroyed rows are nulled out.
    pub fn delete_draft(&self, draft_id: ExtensionId) -> Result<(), Error> {
        let draft = self.get(draft_id)?;
        if !draft.is_draft() {
            return Err(Error::NotDraft);
        }

        let mut removed = vec![draft_id];
        if let Some(public_id) = draft.public_counterpart() {
            if let Some(public_record) = self.store.get(&public_id)? {
                self.destroy(public_id, &public_record)?;
                removed.push(public_id);
            }
        }
        self.destroy(draft_id, &draft)?;
        self.clear_dangling_primaries(draft.kind(), &removed)?;

        debug!(entity = %draft.kind(), "deleted draft extension");
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.store.flush()
    }

    fn validator(&self) -> UniquenessValidator<'_> {
        UniquenessValidator::new(&self.registry, &self.unique)
    }

    fn enforcer(&self) -> InvariantEnforcer<'_> {
        InvariantEnforcer::new(&self.registry, &self.relations)
    }

    fn synchronizer(&self) -> RelationSynchronizer<'_> {
        RelationSynchronizer::new(&self.registry, &self.relations)
    }

    fn require_draft(&self, id: ExtensionId) -> Result<ExtensionRecord, Error> {
        let record = self.get(id)?;
        if !record.is_draft() {
            return Err(Error::NotDraft);
        }
        Ok(record)
    }

    fn check_relation_kinds(
        &self,
        relation: RelationKind,
        owner: &ExtensionRecord,
        members: &[ExtensionId],
    ) -> Result<(), Error> {
        if owner.kind() != relation.owner_kind() {
            return Err(Error::InvalidData(format!(
                "relation {} is owned by {} extensions, not {}",
                relation.as_str(),
                relation.owner_kind(),
                owner.kind()
            )));
        }
        for member in members {
            let record = self.get(*member)?;
            if record.kind() != relation.member_kind() {
                return Err(Error::InvalidData(format!(
                    "relation {} links {} members, not {}",
                    relation.as_str(),
                    relation.member_kind(),
                    record.kind()
                )));
            }
        }
        Ok(())
    }

    /// Null out primary-member pointers that referenced destroyed rows.
    fn clear_dangling_primaries(
        &self,
        removed_kind: ExtensionKind,
        removed: &[ExtensionId],
    ) -> Result<(), Error> {
        for kind in self.registry.kinds() {
            for rule in self.registry.invariants(kind) {
                let InvariantRule::PrimaryMemberOf(relation) = rule;
                if relation.member_kind() != removed_kind {
                    continue;
                }
                for entry in self.store.scan_kind(kind) {
                    let (id, mut record) = entry?;
                    let dangling = rule
                        .primary_member(&record.data)
                        .map_or(false, |primary| removed.contains(&primary));
                    if dangling {
                        rule.clear_primary(&mut record.data);
                        self.store.put(id, &record)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn destroy(&self, id: ExtensionId, record: &ExtensionRecord) -> Result<(), Error> {
        self.validator().release(id, record)?;
        self.relations.scrub(id)?;
        self.pages.release(&record.page.id, id)?;
        self.store.remove(&id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{CourseData, OrganizationData};

    fn test_catalog() -> CatalogService {
        CatalogService::open(StoreConfig::temporary()).unwrap()
    }

    fn draft_page(title: &str) -> PageRef {
        PageRef::draft(ExtensionStore::generate_id(), title)
    }

    fn public_page(title: &str) -> PageRef {
        PageRef::public(ExtensionStore::generate_id(), title)
    }

    fn course(session: Option<&str>, main_organization: Option<ExtensionId>) -> ExtensionData {
        ExtensionData::Course(CourseData {
            active_session: session.map(String::from),
            main_organization,
        })
    }

    fn organization(catalog: &CatalogService, title: &str) -> ExtensionId {
        catalog
            .create_draft(
                draft_page(title),
                ExtensionData::Organization(OrganizationData::default()),
            )
            .unwrap()
    }

    #[test]
    fn test_create_draft_requires_draft_page() {
        let catalog = test_catalog();
        let result = catalog.create_draft(public_page("Course"), course(None, None));
        assert!(matches!(result, Err(Error::NotDraft)));
    }

    #[test]
    fn test_save_requires_matching_kind() {
        let catalog = test_catalog();
        let id = catalog
            .create_draft(draft_page("Course"), course(None, None))
            .unwrap();

        let result = catalog.save_draft(id, ExtensionData::Category);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_save_never_touches_the_counterpart() {
        let catalog = test_catalog();
        let draft = catalog
            .create_draft(draft_page("Course"), course(Some("2024-S1"), None))
            .unwrap();
        let public = catalog.publish(draft, public_page("Course")).unwrap();

        catalog
            .save_draft(draft, course(Some("2024-S2"), None))
            .unwrap();

        let public_record = catalog.get(public).unwrap();
        assert_eq!(
            public_record.data.as_course().unwrap().active_session.as_deref(),
            Some("2024-S1")
        );
    }

    #[test]
    fn test_duplicate_draft_key_rejected() {
        let catalog = test_catalog();
        catalog
            .create_draft(draft_page("C1"), course(Some("2024-S1"), None))
            .unwrap();

        let result = catalog.create_draft(draft_page("C2"), course(Some("2024-S1"), None));
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn test_empty_keys_coexist() {
        let catalog = test_catalog();
        catalog
            .create_draft(draft_page("C1"), course(None, None))
            .unwrap();
        catalog
            .create_draft(draft_page("C2"), course(None, None))
            .unwrap();
    }

    #[test]
    fn test_primary_membership_self_heals_on_save() {
        let catalog = test_catalog();
        let org = organization(&catalog, "Acme University");
        let draft = catalog
            .create_draft(draft_page("Course"), course(None, Some(org)))
            .unwrap();

        let members = catalog
            .members(RelationKind::CourseOrganizations, draft)
            .unwrap();
        assert!(members.contains(&org));
    }

    #[test]
    fn test_primary_membership_self_heals_on_unlink() {
        let catalog = test_catalog();
        let org = organization(&catalog, "Acme University");
        let draft = catalog
            .create_draft(draft_page("Course"), course(None, Some(org)))
            .unwrap();

        catalog
            .unlink(RelationKind::CourseOrganizations, draft, org)
            .unwrap();

        let members = catalog
            .members(RelationKind::CourseOrganizations, draft)
            .unwrap();
        assert!(members.contains(&org));
    }

    #[test]
    fn test_publish_sets_counterpart_and_copies_scalars() {
        let catalog = test_catalog();
        let draft = catalog
            .create_draft(draft_page("Course"), course(Some("2024-S1"), None))
            .unwrap();
        assert!(catalog.get(draft).unwrap().public_counterpart().is_none());

        let public = catalog.publish(draft, public_page("Course")).unwrap();

        let draft_record = catalog.get(draft).unwrap();
        assert_eq!(draft_record.public_counterpart(), Some(public));

        let public_record = catalog.get(public).unwrap();
        assert!(!public_record.is_draft());
        assert!(public_record.public_counterpart().is_none());
        assert_eq!(public_record.data, draft_record.data);
    }

    #[test]
    fn test_publish_rejects_draft_target_page() {
        let catalog = test_catalog();
        let draft = catalog
            .create_draft(draft_page("Course"), course(None, None))
            .unwrap();

        let result = catalog.publish(draft, draft_page("Course"));
        assert!(matches!(result, Err(Error::NotPublicPage)));
    }

    #[test]
    fn test_publish_twice_is_idempotent() {
        let catalog = test_catalog();
        let org = organization(&catalog, "Acme University");
        let draft = catalog
            .create_draft(draft_page("Course"), course(Some("2024-S1"), Some(org)))
            .unwrap();

        let first = catalog.publish(draft, public_page("Course")).unwrap();
        let record_after_first = catalog.get(first).unwrap();
        let members_after_first = catalog
            .members(RelationKind::CourseOrganizations, first)
            .unwrap();

        let second = catalog.publish(draft, public_page("Course")).unwrap();
        assert_eq!(first, second);

        let record_after_second = catalog.get(second).unwrap();
        assert_eq!(record_after_first.data, record_after_second.data);
        assert_eq!(record_after_first.created_at, record_after_second.created_at);

        let members_after_second = catalog
            .members(RelationKind::CourseOrganizations, second)
            .unwrap();
        assert_eq!(members_after_first, members_after_second);
    }

    #[test]
    fn test_relation_copy_is_a_replace() {
        let catalog = test_catalog();
        let relation = RelationKind::CourseOrganizations;

        let org_a = organization(&catalog, "A");
        let org_b = organization(&catalog, "B");
        let org_c = organization(&catalog, "C");

        let draft = catalog
            .create_draft(draft_page("Course"), course(None, None))
            .unwrap();
        catalog.set_relation(relation, draft, &[org_a, org_c]).unwrap();

        let public = catalog.publish(draft, public_page("Course")).unwrap();
        assert!(catalog.members(relation, public).unwrap().contains(&org_c));

        // Draft moves to {A, B}; the public copy still holds {A, C}
        catalog.set_relation(relation, draft, &[org_a, org_b]).unwrap();

        catalog.publish(draft, public_page("Course")).unwrap();
        let members = catalog.members(relation, public).unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&org_a));
        assert!(members.contains(&org_b));
        assert!(!members.contains(&org_c));
    }

    #[test]
    fn test_delete_cascades_to_public() {
        let catalog = test_catalog();
        let draft = catalog
            .create_draft(draft_page("Course"), course(Some("2024-S1"), None))
            .unwrap();
        let public = catalog.publish(draft, public_page("Course")).unwrap();

        catalog.delete_draft(draft).unwrap();

        assert!(matches!(catalog.get(draft), Err(Error::NotFound)));
        assert!(matches!(catalog.get(public), Err(Error::NotFound)));

        // The key is free again in both partitions
        catalog
            .create_draft(draft_page("Course"), course(Some("2024-S1"), None))
            .unwrap();
    }

    #[test]
    fn test_mutations_rejected_on_public_rows() {
        let catalog = test_catalog();
        let draft = catalog
            .create_draft(draft_page("Course"), course(None, None))
            .unwrap();
        let public = catalog.publish(draft, public_page("Course")).unwrap();

        assert!(matches!(
            catalog.save_draft(public, course(None, None)),
            Err(Error::NotDraft)
        ));
        assert!(matches!(
            catalog.link(RelationKind::CourseOrganizations, public, [1u8; 16]),
            Err(Error::NotDraft)
        ));
        assert!(matches!(catalog.delete_draft(public), Err(Error::NotDraft)));
    }

    #[test]
    fn test_page_extended_at_most_once() {
        let catalog = test_catalog();
        let page = draft_page("Course");
        catalog.create_draft(page.clone(), course(None, None)).unwrap();

        let result = catalog.create_draft(page, ExtensionData::Category);
        assert!(matches!(result, Err(Error::PageAlreadyExtended)));
    }

    #[test]
    fn test_publish_rejects_occupied_public_page() {
        let catalog = test_catalog();
        let d1 = catalog
            .create_draft(draft_page("C1"), course(None, None))
            .unwrap();
        let d2 = catalog
            .create_draft(draft_page("C2"), course(None, None))
            .unwrap();

        let page = public_page("Course");
        catalog.publish(d1, page.clone()).unwrap();

        let result = catalog.publish(d2, page);
        assert!(matches!(result, Err(Error::PageAlreadyExtended)));
    }

    #[test]
    fn test_delete_frees_the_pages() {
        let catalog = test_catalog();
        let draft_ref = draft_page("Course");
        let public_ref = public_page("Course");
        let draft = catalog
            .create_draft(draft_ref.clone(), course(None, None))
            .unwrap();
        catalog.publish(draft, public_ref.clone()).unwrap();

        catalog.delete_draft(draft).unwrap();

        // Both pages are attachable again
        let replacement = catalog.create_draft(draft_ref, course(None, None)).unwrap();
        catalog.publish(replacement, public_ref).unwrap();
    }

    #[test]
    fn test_failed_create_rolls_back_its_claims() {
        let catalog = test_catalog();
        catalog
            .create_draft(draft_page("C1"), course(Some("2024-S1"), None))
            .unwrap();

        let page = draft_page("C2");
        let result = catalog.create_draft(page.clone(), course(Some("2024-S1"), None));
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));

        // The rejected create left the page unclaimed
        catalog
            .create_draft(page, course(Some("2024-S2"), None))
            .unwrap();
    }

    #[test]
    fn test_failed_publish_rolls_back_its_claims() {
        let catalog = test_catalog();
        let c1 = catalog
            .create_draft(draft_page("C1"), course(Some("2024-S1"), None))
            .unwrap();
        catalog.publish(c1, public_page("C1")).unwrap();
        catalog.save_draft(c1, course(Some("2024-S2"), None)).unwrap();

        // A second draft takes the freed key, then collides with C1's
        // public copy at publish time
        let c2 = catalog
            .create_draft(draft_page("C2"), course(Some("2024-S1"), None))
            .unwrap();
        let page = public_page("C2");
        let result = catalog.publish(c2, page.clone());
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));

        // The rejected publish left the page unclaimed
        catalog.save_draft(c2, course(Some("2024-S3"), None)).unwrap();
        catalog.publish(c2, page).unwrap();
    }

    #[test]
    fn test_link_checks_member_kind() {
        let catalog = test_catalog();
        let c1 = catalog
            .create_draft(draft_page("C1"), course(None, None))
            .unwrap();
        let c2 = catalog
            .create_draft(draft_page("C2"), course(None, None))
            .unwrap();

        let result = catalog.link(RelationKind::CourseOrganizations, c1, c2);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        let result = catalog.set_relation(RelationKind::CourseSubjects, c1, &[c2]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_link_checks_owner_kind() {
        let catalog = test_catalog();
        let org_a = organization(&catalog, "A");
        let org_b = organization(&catalog, "B");

        let result = catalog.link(RelationKind::CourseOrganizations, org_a, org_b);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_deleting_an_organization_clears_primary_pointers() {
        let catalog = test_catalog();
        let org = organization(&catalog, "Acme University");
        let draft = catalog
            .create_draft(draft_page("Course"), course(None, Some(org)))
            .unwrap();
        let public = catalog.publish(draft, public_page("Course")).unwrap();

        catalog.delete_draft(org).unwrap();

        let draft_record = catalog.get(draft).unwrap();
        assert!(draft_record
            .data
            .as_course()
            .unwrap()
            .main_organization
            .is_none());
        let public_record = catalog.get(public).unwrap();
        assert!(public_record
            .data
            .as_course()
            .unwrap()
            .main_organization
            .is_none());
    }

    #[test]
    fn test_validate_is_side_effect_free() {
        let catalog = test_catalog();
        catalog
            .create_draft(draft_page("C1"), course(Some("2024-S1"), None))
            .unwrap();

        let candidate = ExtensionRecord::new(draft_page("C2"), course(Some("2024-S1"), None));
        let id = ExtensionStore::generate_id();

        assert!(catalog.validate(id, &candidate).is_err());
        // Nothing was claimed or written
        assert!(matches!(catalog.get(id), Err(Error::NotFound)));
        assert!(catalog.validate(id, &candidate).is_err());
    }
}
