//! The registry of extension specs.

use std::collections::HashMap;

use super::rules::{BusinessKey, InvariantRule, SyncRule};
use crate::extension::ExtensionKind;
use crate::store::RelationKind;

/// Everything the generic tooling needs to know about one extension kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionSpec {
    /// The kind this spec describes.
    pub kind: ExtensionKind,
    /// Business keys checked by the uniqueness validator.
    pub business_keys: Vec<BusinessKey>,
    /// Relations re-synchronized at publish time.
    pub sync_rules: Vec<SyncRule>,
    /// Post-write correction rules.
    pub invariants: Vec<InvariantRule>,
}

impl ExtensionSpec {
    /// Create a spec with no rules.
    pub fn new(kind: ExtensionKind) -> Self {
        Self {
            kind,
            business_keys: Vec::new(),
            sync_rules: Vec::new(),
            invariants: Vec::new(),
        }
    }

    /// Declare a business key.
    pub fn with_business_key(mut self, key: BusinessKey) -> Self {
        self.business_keys.push(key);
        self
    }

    /// Declare a relation-sync rule.
    pub fn with_sync_rule(mut self, rule: SyncRule) -> Self {
        self.sync_rules.push(rule);
        self
    }

    /// Declare an invariant rule.
    pub fn with_invariant(mut self, rule: InvariantRule) -> Self {
        self.invariants.push(rule);
        self
    }
}

/// Process-wide catalog of extension specs, built once and read-mostly.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    specs: HashMap<ExtensionKind, ExtensionSpec>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shipped with the catalog: all five built-in kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            ExtensionSpec::new(ExtensionKind::Course)
                .with_business_key(BusinessKey::CourseActiveSession)
                .with_sync_rule(SyncRule::Forward(RelationKind::CourseOrganizations))
                .with_sync_rule(SyncRule::Forward(RelationKind::CourseSubjects))
                .with_invariant(InvariantRule::PrimaryMemberOf(
                    RelationKind::CourseOrganizations,
                )),
        );
        // Subjects sit on the inverse side of course_subjects and copy it
        // from there when published.
        registry.register(
            ExtensionSpec::new(ExtensionKind::Subject)
                .with_sync_rule(SyncRule::Inverse(RelationKind::CourseSubjects)),
        );
        registry.register(ExtensionSpec::new(ExtensionKind::Organization));
        registry.register(ExtensionSpec::new(ExtensionKind::Category));
        registry.register(ExtensionSpec::new(ExtensionKind::CourseRun));

        registry
    }

    /// Register a spec, replacing any previous spec for the same kind.
    pub fn register(&mut self, spec: ExtensionSpec) {
        self.specs.insert(spec.kind, spec);
    }

    /// Get the spec for a kind.
    pub fn spec(&self, kind: ExtensionKind) -> Option<&ExtensionSpec> {
        self.specs.get(&kind)
    }

    /// Whether a kind participates in the protocol.
    pub fn is_registered(&self, kind: ExtensionKind) -> bool {
        self.specs.contains_key(&kind)
    }

    /// Business keys declared for a kind.
    pub fn business_keys(&self, kind: ExtensionKind) -> &[BusinessKey] {
        self.spec(kind).map(|s| s.business_keys.as_slice()).unwrap_or(&[])
    }

    /// Sync rules declared for a kind.
    pub fn sync_rules(&self, kind: ExtensionKind) -> &[SyncRule] {
        self.spec(kind).map(|s| s.sync_rules.as_slice()).unwrap_or(&[])
    }

    /// Invariant rules declared for a kind.
    pub fn invariants(&self, kind: ExtensionKind) -> &[InvariantRule] {
        self.spec(kind).map(|s| s.invariants.as_slice()).unwrap_or(&[])
    }

    /// All registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = ExtensionKind> + '_ {
        self.specs.keys().copied()
    }
}
