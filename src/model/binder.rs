//! Binds call sites to method declarations where the model alone makes the
//! target unambiguous.

use super::{CallKind, CallSite, JavaModel, MethodId, Receiver};

/// Bind every call site in the model; returns how many were bound
pub fn bind_calls(model: &mut JavaModel) -> usize {
    let bindings: Vec<Option<MethodId>> = model
        .calls()
        .iter()
        .map(|call| bind(model, call))
        .collect();

    let mut bound = 0;
    for (call, binding) in model.calls_mut().iter_mut().zip(bindings) {
        if binding.is_some() {
            bound += 1;
        }
        call.binding = binding;
    }
    bound
}

/// The single method a call site can target, if the receiver's type resolves
/// and exactly one method of that name and arity is visible on it
pub fn bind(model: &JavaModel, call: &CallSite) -> Option<MethodId> {
    let arity = match call.kind {
        CallKind::Invocation => call.arg_count,
        CallKind::MethodReference => None,
    };

    match &call.receiver {
        Receiver::Implicit | Receiver::This => {
            let mut scope = call.enclosing_type;
            while let Some(ty) = scope {
                let found = model.find_methods(ty, &call.method_name, arity);
                if !found.is_empty() {
                    return unique(&found);
                }
                // `this.m()` never reaches outer instances
                if call.receiver == Receiver::This {
                    break;
                }
                scope = model.type_decl(ty).enclosing;
            }
            if call.receiver == Receiver::Implicit {
                return bind_static_import(model, call, arity);
            }
            None
        }
        Receiver::Super => {
            let ty = call.enclosing_type?;
            let superclass = model.type_decl(ty).superclass.as_deref()?;
            let target = model.resolve_type(superclass, ty)?;
            unique(&model.find_methods(target, &call.method_name, arity))
        }
        Receiver::Type(name)
        | Receiver::Variable {
            static_type: Some(name),
            ..
        } => {
            let target = model.resolve_in_scope(name, call.unit, call.enclosing_type)?;
            unique(&model.find_methods(target, &call.method_name, arity))
        }
        Receiver::Variable {
            static_type: None, ..
        }
        | Receiver::Expression => None,
    }
}

/// Implicit calls that no enclosing type declares, matched against the
/// unit's static imports; single-member imports shadow on-demand ones
fn bind_static_import(
    model: &JavaModel,
    call: &CallSite,
    arity: Option<usize>,
) -> Option<MethodId> {
    model
        .static_import_targets(call.unit, &call.method_name)
        .into_iter()
        .find_map(|target| {
            let found: Vec<MethodId> = model
                .find_methods(target, &call.method_name, arity)
                .into_iter()
                .filter(|&m| model.method(m).is_static)
                .collect();
            (!found.is_empty()).then(|| unique(&found))
        })
        .flatten()
}

fn unique(found: &[MethodId]) -> Option<MethodId> {
    match found {
        [only] => Some(*only),
        _ => None,
    }
}
