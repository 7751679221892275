use super::{ExclusionPolicy, Reference};
use crate::model::{JavaModel, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Type-level usage: a type is used when any type other than itself (or a
/// type nested inside it) mentions it
pub struct ClassUsageResolver {
    model: Arc<JavaModel>,
    policy: ExclusionPolicy,

    /// Referenced type to the types referencing it
    referenced_by: HashMap<TypeId, HashSet<TypeId>>,

    /// References from types nested in the target; these never count as use
    nested_refs: HashMap<TypeId, HashSet<TypeId>>,
}

impl ClassUsageResolver {
    pub fn new(model: Arc<JavaModel>, policy: ExclusionPolicy) -> Self {
        let mut referenced_by: HashMap<TypeId, HashSet<TypeId>> = HashMap::new();
        let mut nested_refs: HashMap<TypeId, HashSet<TypeId>> = HashMap::new();

        for ty in model.types() {
            for name in &ty.type_refs {
                let Some(target) = model.resolve_type(name, ty.id) else {
                    continue;
                };
                if ty.id == target {
                    continue;
                }
                if model.is_nested_in(ty.id, target) {
                    nested_refs.entry(target).or_default().insert(ty.id);
                    continue;
                }
                referenced_by.entry(target).or_default().insert(ty.id);
            }
        }

        debug!("Class usage map: {} referenced types", referenced_by.len());
        Self {
            model,
            policy,
            referenced_by,
            nested_refs,
        }
    }

    /// Types eligible for an unused-class finding, in model order
    pub fn candidates(&self) -> Vec<TypeId> {
        self.model
            .types()
            .iter()
            .filter(|t| self.policy.is_class_candidate(t))
            .map(|t| t.id)
            .collect()
    }

    pub fn is_used(&self, ty: TypeId) -> bool {
        self.referenced_by
            .get(&ty)
            .map_or(false, |refs| !refs.is_empty())
    }

    /// Qualified names of the types referencing `ty`, including types nested
    /// inside it
    pub fn referencing(&self, ty: TypeId) -> Vec<String> {
        let mut names: Vec<String> = self
            .referenced_by
            .get(&ty)
            .into_iter()
            .chain(self.nested_refs.get(&ty))
            .flatten()
            .map(|&id| self.model.type_decl(id).qualified_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Unused types among a batch of candidates
    pub fn unused_in(&self, batch: &[TypeId]) -> Vec<Reference> {
        batch
            .iter()
            .copied()
            .filter(|&id| !self.is_used(id))
            .map(|id| {
                let ty = self.model.type_decl(id);
                let mut reference =
                    Reference::new(ty.qualified_name.clone()).with_location(ty.location.clone());
                for name in self.referencing(id) {
                    reference.append(name);
                }
                reference
            })
            .collect()
    }
}
