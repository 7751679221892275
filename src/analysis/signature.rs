use crate::model::{JavaModel, MethodId};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// `<declaring-simple-name>#<method-name>#<param-count>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey(String);

impl SignatureKey {
    pub fn new(declaring: &str, method: &str, param_count: usize) -> Self {
        Self(format!("{}#{}#{}", declaring, method, param_count))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Methods keyed by declaring simple name, name and arity.
///
/// Same-named types in different packages collide; the method inserted last
/// (in model order) keeps the key.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    by_key: HashMap<SignatureKey, MethodId>,
}

impl SignatureIndex {
    pub fn build(model: &JavaModel) -> Self {
        let mut by_key = HashMap::with_capacity(model.methods().len());
        for method in model.methods() {
            let declaring = model.type_decl(method.declaring_type);
            let key = SignatureKey::new(&declaring.name, &method.name, method.parameters.len());
            by_key.insert(key, method.id);
        }

        debug!(
            "Signature index: {} keys for {} methods",
            by_key.len(),
            model.methods().len()
        );
        Self { by_key }
    }

    pub fn get(&self, declaring: &str, method: &str, param_count: usize) -> Option<MethodId> {
        self.by_key
            .get(&SignatureKey::new(declaring, method, param_count))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
