use super::ExclusionPolicy;
use crate::model::{last_segment, JavaModel, TypeId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Ancestor simple name to the concrete classes below it.
///
/// Every class is registered under its own name and under each superclass and
/// interface reachable from it, so a call through any ancestor can reach the
/// implementations.
#[derive(Debug, Default)]
pub struct ImplementerIndex {
    by_ancestor: HashMap<String, Vec<TypeId>>,
}

impl ImplementerIndex {
    pub fn build(model: &JavaModel, policy: &ExclusionPolicy) -> Self {
        let mut index = Self::default();

        for ty in model.types().iter().filter(|t| policy.is_implementer(t)) {
            index.register(&ty.name, ty.id);

            let mut visited = HashSet::from([ty.id]);
            index.register_ancestors(model, ty.id, ty.id, &mut visited);
        }

        debug!("Implementer index: {} ancestor names", index.by_ancestor.len());
        index
    }

    fn register_ancestors(
        &mut self,
        model: &JavaModel,
        current: TypeId,
        implementer: TypeId,
        visited: &mut HashSet<TypeId>,
    ) {
        for name in model.type_decl(current).super_types() {
            self.register(last_segment(name), implementer);

            // Ancestors outside the parsed sources end the walk
            if let Some(parent) = model.resolve_type(name, current) {
                if visited.insert(parent) {
                    self.register_ancestors(model, parent, implementer, visited);
                }
            }
        }
    }

    fn register(&mut self, ancestor: &str, implementer: TypeId) {
        let entry = self.by_ancestor.entry(ancestor.to_string()).or_default();
        if !entry.contains(&implementer) {
            entry.push(implementer);
        }
    }

    /// Classes registered under an ancestor simple name
    pub fn implementers_of(&self, ancestor: &str) -> &[TypeId] {
        self.by_ancestor
            .get(ancestor)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
