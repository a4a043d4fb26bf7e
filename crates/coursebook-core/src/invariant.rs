//! Post-write invariant enforcement.
//!
//! Correction rules run after a row is persisted and may perform
//! corrective writes. The course rule mirrors the catalog's oldest
//! invariant: the main organization is always a member of the course's
//! organizations relation. A missing membership is added, not rejected.

use tracing::debug;

use crate::catalog::{ExtensionRegistry, InvariantRule};
use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionRecord};
use crate::store::RelationStore;

/// Runs the correction rules declared in the registry after each save.
pub struct InvariantEnforcer<'a> {
    registry: &'a ExtensionRegistry,
    relations: &'a RelationStore,
}

impl<'a> InvariantEnforcer<'a> {
    /// Create a new enforcer.
    pub fn new(registry: &'a ExtensionRegistry, relations: &'a RelationStore) -> Self {
        Self { registry, relations }
    }

    /// Run every rule declared for the record's kind.
    ///
    /// Only call with a persisted identity: a rule cannot add relation
    /// members before the row exists. Rules are idempotent. A failed
    /// corrective write is fatal to the enclosing operation.
    pub fn enforce(&self, id: ExtensionId, record: &ExtensionRecord) -> Result<(), Error> {
        for rule in self.registry.invariants(record.kind()) {
            match rule {
                InvariantRule::PrimaryMemberOf(relation) => {
                    let Some(primary) = rule.primary_member(&record.data) else {
                        continue;
                    };
                    if self
                        .relations
                        .contains(*relation, &id, &primary)
                        .map_err(correction_failure)?
                    {
                        continue;
                    }
                    self.relations
                        .link(*relation, id, primary)
                        .map_err(correction_failure)?;
                    debug!(
                        entity = %record.kind(),
                        relation = relation.as_str(),
                        "added primary member to relation"
                    );
                }
            }
        }
        Ok(())
    }
}

fn correction_failure(err: Error) -> Error {
    Error::IntegrityCorrection(err.to_string())
}
