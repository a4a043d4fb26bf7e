//! Extension registry.
//!
//! A process-wide, read-mostly catalog of which extension kinds
//! participate in the draft/publish protocol and which business keys,
//! relation-sync rules and invariants apply to each. New kinds opt into
//! the protocol by registering a spec, not by re-implementing it.

mod registry;
mod rules;

pub use registry::{ExtensionRegistry, ExtensionSpec};
pub use rules::{BusinessKey, InvariantRule, SyncRule};
