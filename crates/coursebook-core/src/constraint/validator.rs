//! Uniqueness validation logic.
//!
//! The validator checks the business keys declared in the registry before
//! a write commits. Uniqueness cannot be a plain index constraint because
//! rows exist in two versions: the check is scoped to the candidate's own
//! partition, so a draft and its published copy may share a value while
//! two drafts may not.

use crate::catalog::ExtensionRegistry;
use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionRecord};
use crate::store::{Partition, ScopedUniqueIndex};

/// Validator for partition-scoped business-key uniqueness.
pub struct UniquenessValidator<'a> {
    registry: &'a ExtensionRegistry,
    index: &'a ScopedUniqueIndex,
}

impl<'a> UniquenessValidator<'a> {
    /// Create a new validator.
    pub fn new(registry: &'a ExtensionRegistry, index: &'a ScopedUniqueIndex) -> Self {
        Self { registry, index }
    }

    /// Check every declared business key of a candidate without writing.
    ///
    /// Separately callable so validation can be exercised without a save.
    /// Keys without a value are exempt.
    pub fn validate(&self, id: ExtensionId, candidate: &ExtensionRecord) -> Result<(), Error> {
        let kind = candidate.kind();
        let partition = Partition::of(candidate.is_draft());

        for key in self.registry.business_keys(kind) {
            let Some(value) = key.value(&candidate.data) else {
                continue;
            };
            if !self.index.check(kind, key.field(), partition, value, id)? {
                return Err(Error::DuplicateKey {
                    entity: kind.as_str().to_string(),
                    field: key.field().to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Claim the candidate's business-key values, releasing any values the
    /// previous version of the row held that have changed.
    ///
    /// New values are claimed before old ones are released, so a failed
    /// claim leaves the previous claims intact.
    pub fn claim(
        &self,
        id: ExtensionId,
        previous: Option<&ExtensionRecord>,
        candidate: &ExtensionRecord,
    ) -> Result<(), Error> {
        let kind = candidate.kind();
        let partition = Partition::of(candidate.is_draft());

        for key in self.registry.business_keys(kind) {
            let new_value = key.value(&candidate.data);
            let old_value = previous.and_then(|record| key.value(&record.data));

            if let Some(value) = new_value {
                self.index.claim(kind, key.field(), partition, value, id)?;
            }
            if let Some(old) = old_value {
                if new_value != Some(old) {
                    self.index.release(kind, key.field(), partition, old, id)?;
                }
            }
        }
        Ok(())
    }

    /// Release every claim held by a row. Used when the row is destroyed.
    pub fn release(&self, id: ExtensionId, record: &ExtensionRecord) -> Result<(), Error> {
        let kind = record.kind();
        let partition = Partition::of(record.is_draft());

        for key in self.registry.business_keys(kind) {
            if let Some(value) = key.value(&record.data) {
                self.index.release(kind, key.field(), partition, value, id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{CourseData, ExtensionData};
    use crate::page::PageRef;

    fn setup() -> (sled::Db, ExtensionRegistry) {
        let db = sled::Config::new().temporary(true).open().unwrap();
        (db, ExtensionRegistry::builtin())
    }

    fn course(session: Option<&str>, is_draft: bool) -> ExtensionRecord {
        let page = if is_draft {
            PageRef::draft([0u8; 16], "Course")
        } else {
            PageRef::public([0u8; 16], "Course")
        };
        ExtensionRecord::new(
            page,
            ExtensionData::Course(CourseData {
                active_session: session.map(String::from),
                main_organization: None,
            }),
        )
    }

    #[test]
    fn test_two_drafts_with_same_key_collide() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        let d1 = course(Some("2024-S1"), true);
        validator.claim([1u8; 16], None, &d1).unwrap();

        let d2 = course(Some("2024-S1"), true);
        assert!(validator.validate([2u8; 16], &d2).is_err());
        let result = validator.claim([2u8; 16], None, &d2);
        match result {
            Err(Error::DuplicateKey { field, value, .. }) => {
                assert_eq!(field, "active_session");
                assert_eq!(value, "2024-S1");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_and_public_may_share_a_key() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        validator
            .claim([1u8; 16], None, &course(Some("2024-S1"), true))
            .unwrap();
        validator
            .claim([2u8; 16], None, &course(Some("2024-S1"), false))
            .unwrap();
    }

    #[test]
    fn test_empty_keys_are_exempt() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        // Several drafts with no active session coexist
        validator.claim([1u8; 16], None, &course(None, true)).unwrap();
        validator.claim([2u8; 16], None, &course(None, true)).unwrap();
        validator
            .claim([3u8; 16], None, &course(Some(""), true))
            .unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_resave_with_same_key_passes() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        let record = course(Some("2024-S1"), true);
        validator.claim([1u8; 16], None, &record).unwrap();
        validator.validate([1u8; 16], &record).unwrap();
        validator.claim([1u8; 16], Some(&record), &record).unwrap();
    }

    #[test]
    fn test_changing_key_releases_old_value() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        let old = course(Some("2024-S1"), true);
        validator.claim([1u8; 16], None, &old).unwrap();

        let new = course(Some("2024-S2"), true);
        validator.claim([1u8; 16], Some(&old), &new).unwrap();

        // Old value is free for another draft
        validator
            .claim([2u8; 16], None, &course(Some("2024-S1"), true))
            .unwrap();
    }

    #[test]
    fn test_release_on_destroy() {
        let (db, registry) = setup();
        let index = ScopedUniqueIndex::open(&db).unwrap();
        let validator = UniquenessValidator::new(&registry, &index);

        let record = course(Some("2024-S1"), true);
        validator.claim([1u8; 16], None, &record).unwrap();
        validator.release([1u8; 16], &record).unwrap();

        validator
            .claim([2u8; 16], None, &course(Some("2024-S1"), true))
            .unwrap();
    }
}
