//! Relation synchronization at publish time.
//!
//! A row-level snapshot copies scalar fields but not join pairs, so each
//! declared relation must be re-synchronized explicitly when a draft is
//! published. The public side becomes an exact copy of the draft side as
//! of that moment and stays frozen until the next publish.

use tracing::debug;

use crate::catalog::{ExtensionRegistry, SyncRule};
use crate::error::Error;
use crate::extension::{ExtensionId, ExtensionKind};
use crate::store::{ExtensionStore, RelationStore};

/// Copies declared relation membership from a draft to its public
/// counterpart with set-replace semantics.
pub struct RelationSynchronizer<'a> {
    registry: &'a ExtensionRegistry,
    relations: &'a RelationStore,
}

impl<'a> RelationSynchronizer<'a> {
    /// Create a new synchronizer.
    pub fn new(registry: &'a ExtensionRegistry, relations: &'a RelationStore) -> Self {
        Self { registry, relations }
    }

    /// Replace the public row's membership with the draft's, for every
    /// relation declared for the kind.
    ///
    /// The public row must already exist; copy targets are never relations
    /// on a non-existent row. Idempotent: publishing twice with no
    /// intervening draft change yields the same public state.
    pub fn sync(
        &self,
        store: &ExtensionStore,
        kind: ExtensionKind,
        draft_id: ExtensionId,
        public_id: ExtensionId,
    ) -> Result<(), Error> {
        if !store.contains(&public_id)? {
            return Err(Error::MissingPublicTarget {
                entity: kind.as_str().to_string(),
            });
        }

        for rule in self.registry.sync_rules(kind) {
            match rule {
                SyncRule::Forward(relation) => {
                    let members = self.relations.members(*relation, &draft_id)?;
                    self.relations.set_members(*relation, public_id, &members)?;
                }
                SyncRule::Inverse(relation) => {
                    let owners = self.relations.owners(*relation, &draft_id)?;
                    self.relations.set_owners(*relation, public_id, &owners)?;
                }
            }
            debug!(
                entity = %kind,
                relation = rule.relation().as_str(),
                "synchronized relation to public counterpart"
            );
        }

        Ok(())
    }
}
