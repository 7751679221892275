//! Resolves call sites to the methods they use.
//!
//! Each call goes through the resolution steps in order until one yields a
//! method:
//!
//! 1. the binding computed while building the model
//! 2. the signature index with the statically known declaring type and the
//!    call's argument count
//! 3. the same key with argument counts 0 and 1 (method references and
//!    functional adapters)
//! 4. steps 2 and 3 with the last segment of a qualified declaring type
//! 5. for implicit and `this` calls, steps 2 to 4 with the compilation
//!    unit's simple name as declaring type
//!
//! A resolved method is marked used along with the same-signature methods of
//! every class registered below its declaring type in the implementer index.

use super::{ExclusionPolicy, ImplementerIndex, SignatureIndex};
use crate::model::{last_segment, strip_generics, CallId, CallSite, JavaModel, MethodId, Receiver};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// Methods found used during one scan; safe to extend from many workers
#[derive(Debug, Default)]
pub struct UsedSet {
    methods: Mutex<HashSet<MethodId>>,
}

impl UsedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of used methods under one lock
    pub fn extend(&self, batch: HashSet<MethodId>) {
        let mut methods = self.methods.lock().unwrap_or_else(PoisonError::into_inner);
        methods.extend(batch);
    }

    pub fn contains(&self, method: MethodId) -> bool {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&method)
    }

    pub fn len(&self) -> usize {
        self.methods.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents; workers abandoned after a timeout may
    /// still hold the set
    pub fn snapshot(&self) -> HashSet<MethodId> {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Call-site resolver over one bound model and its indexes
pub struct MethodUsageResolver {
    model: Arc<JavaModel>,
    signatures: SignatureIndex,
    implementers: ImplementerIndex,
    policy: ExclusionPolicy,
}

impl MethodUsageResolver {
    /// Build both indexes; they are read-only afterwards
    pub fn new(model: Arc<JavaModel>, policy: ExclusionPolicy) -> Self {
        let signatures = SignatureIndex::build(&model);
        let implementers = ImplementerIndex::build(&model, &policy);
        Self {
            model,
            signatures,
            implementers,
            policy,
        }
    }

    pub fn model(&self) -> &JavaModel {
        &self.model
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    /// Resolve every call site of the model on the calling thread
    pub fn resolve_used_methods(&self) -> HashSet<MethodId> {
        let all: Vec<CallId> = (0..self.model.calls().len()).collect();
        self.resolve_batch(&all)
    }

    /// Resolve a batch of call sites into the methods they use
    pub fn resolve_batch(&self, calls: &[CallId]) -> HashSet<MethodId> {
        let mut used = HashSet::new();

        for &id in calls {
            let call = &self.model.calls()[id];

            if self
                .policy
                .skips_container_call(&call.method_name, self.known_declaring_type(call).as_deref())
            {
                trace!("Skipping container call {} at line {}", call.method_name, call.line);
                continue;
            }

            match self.resolve_call(call) {
                Some(method) => {
                    used.insert(method);
                    self.propagate(method, call, &mut used);
                }
                None => debug!(
                    "Unresolved call {}{} in {}:{}",
                    self.static_declaring_type(call)
                        .map(|t| format!("{}#", t))
                        .unwrap_or_default(),
                    call.method_name,
                    self.model.unit(call.unit).path.display(),
                    call.line
                ),
            }
        }

        used
    }

    /// The method a call site targets, or `None` when no step resolves it
    pub fn resolve_call(&self, call: &CallSite) -> Option<MethodId> {
        if let Some(bound) = call.binding {
            return Some(bound);
        }

        if let Some(declaring) = self.static_declaring_type(call) {
            if let Some(method) = self.lookup_signature(&declaring, call) {
                return Some(method);
            }
        }

        match call.receiver {
            Receiver::Implicit | Receiver::This => {
                let own = self
                    .model
                    .unit(call.unit)
                    .simple_name()
                    .and_then(|unit_name| self.lookup_signature(unit_name, call));
                if own.is_some() || call.receiver == Receiver::This {
                    return own;
                }
                self.model
                    .static_import_targets(call.unit, &call.method_name)
                    .into_iter()
                    .find_map(|ty| {
                        let name = self.model.type_decl(ty).name.clone();
                        self.lookup_signature(&name, call)
                    })
            }
            _ => None,
        }
    }

    /// Signature-index steps for one declaring type name
    fn lookup_signature(&self, declaring: &str, call: &CallSite) -> Option<MethodId> {
        let written = strip_generics(declaring);
        let last = last_segment(&written);

        let mut names = vec![written.as_str()];
        if last != written {
            names.push(last);
        }

        names.into_iter().find_map(|name| {
            call.arg_count
                .into_iter()
                .chain([0, 1])
                .find_map(|count| self.signatures.get(name, &call.method_name, count))
        })
    }

    /// Declaring type visible from the call site alone
    fn static_declaring_type(&self, call: &CallSite) -> Option<String> {
        match &call.receiver {
            Receiver::Super => call
                .enclosing_type
                .and_then(|t| self.model.type_decl(t).superclass.clone()),
            _ => call.static_declaring_type().map(str::to_string),
        }
    }

    /// Declaring type as far as it is known at all, used to decide whether a
    /// container-style call is skipped
    fn known_declaring_type(&self, call: &CallSite) -> Option<String> {
        if let Some(bound) = call.binding {
            return Some(self.model.declaring_type(bound).name.clone());
        }
        if let Some(declaring) = self.static_declaring_type(call) {
            return Some(declaring);
        }
        match call.receiver {
            Receiver::Implicit | Receiver::This => call
                .enclosing_type
                .map(|t| self.model.type_decl(t).name.clone()),
            _ => None,
        }
    }

    /// Mark the same-signature methods of every implementer below the
    /// resolved method's declaring type, and below the receiver's static type
    fn propagate(&self, method: MethodId, call: &CallSite, used: &mut HashSet<MethodId>) {
        let target = self.model.method(method);

        let mut ancestors = vec![self.model.declaring_type(method).name.clone()];
        if let Some(receiver_type) = self.static_declaring_type(call) {
            let simple = last_segment(&strip_generics(&receiver_type)).to_string();
            if !ancestors.contains(&simple) {
                ancestors.push(simple);
            }
        }

        for ancestor in &ancestors {
            for &implementer in self.implementers.implementers_of(ancestor) {
                let found = self
                    .model
                    .type_decl(implementer)
                    .methods
                    .iter()
                    .copied()
                    .find(|&m| self.model.method(m).same_signature(target));
                if let Some(m) = found {
                    used.insert(m);
                }
            }
        }
    }
}
