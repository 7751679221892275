//! Parsed model of a Java source tree.
//!
//! Types, methods and call sites live in flat arenas addressed by index.
//! The model is built once per scan by [`ModelBuilder`], bound by
//! [`binder`], and then only read.

pub mod binder;
mod builder;
mod declaration;

pub use builder::{ModelBuilder, ParseOptions};
pub use declaration::{
    last_segment, simple_type_name, strip_generics, Annotation, CallId, CallKind, CallSite,
    Location, MethodDecl, MethodId, Parameter, Receiver, StaticImport, TypeDecl, TypeId, TypeKind,
    UnitId, UnitInfo,
};

use crate::error::{ScanError, ScanResult};
use crate::parser::CompilationUnit;
use std::collections::{HashMap, HashSet, VecDeque};

/// All declarations and call sites of one parsed source tree
#[derive(Debug, Default)]
pub struct JavaModel {
    units: Vec<UnitInfo>,
    types: Vec<TypeDecl>,
    methods: Vec<MethodDecl>,
    calls: Vec<CallSite>,

    /// Qualified name to the first type declared under it
    by_qualified: HashMap<String, TypeId>,

    /// Simple name to every type declared under it
    by_simple: HashMap<String, Vec<TypeId>>,
}

impl JavaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed compilation unit, remapping its local ids into the arenas.
    ///
    /// With `allow_duplicates` unset a second declaration of an already known
    /// qualified name is an error; otherwise the first declaration keeps the name.
    pub fn add_unit(&mut self, unit: CompilationUnit, allow_duplicates: bool) -> ScanResult<UnitId> {
        let unit_id = self.units.len();
        let type_offset = self.types.len();
        let method_offset = self.methods.len();
        let call_offset = self.calls.len();

        if !allow_duplicates {
            for ty in &unit.types {
                if let Some(&existing) = self.by_qualified.get(&ty.qualified_name) {
                    let first = self.units[self.types[existing].unit].path.clone();
                    return Err(ScanError::DuplicateDeclaration {
                        qualified_name: ty.qualified_name.clone(),
                        first,
                        second: unit.info.path.clone(),
                    });
                }
            }
        }

        for mut ty in unit.types {
            ty.id += type_offset;
            ty.unit = unit_id;
            ty.enclosing = ty.enclosing.map(|e| e + type_offset);
            for m in &mut ty.methods {
                *m += method_offset;
            }

            self.by_qualified
                .entry(ty.qualified_name.clone())
                .or_insert(ty.id);
            self.by_simple.entry(ty.name.clone()).or_default().push(ty.id);
            self.types.push(ty);
        }

        for mut method in unit.methods {
            method.id += method_offset;
            method.declaring_type += type_offset;
            self.methods.push(method);
        }

        for mut call in unit.calls {
            call.id += call_offset;
            call.unit = unit_id;
            call.enclosing_type = call.enclosing_type.map(|t| t + type_offset);
            self.calls.push(call);
        }

        self.units.push(unit.info);
        Ok(unit_id)
    }

    pub fn units(&self) -> &[UnitInfo] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &UnitInfo {
        &self.units[id]
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id]
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id]
    }

    pub fn calls(&self) -> &[CallSite] {
        &self.calls
    }

    pub(crate) fn calls_mut(&mut self) -> &mut [CallSite] {
        &mut self.calls
    }

    /// Declaring type of a method
    pub fn declaring_type(&self, method: MethodId) -> &TypeDecl {
        &self.types[self.methods[method].declaring_type]
    }

    pub fn find_by_qualified(&self, qualified: &str) -> Option<TypeId> {
        self.by_qualified.get(qualified).copied()
    }

    pub fn find_by_simple(&self, simple: &str) -> &[TypeId] {
        self.by_simple.get(simple).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether `inner` is `outer` or lexically nested inside it
    pub fn is_nested_in(&self, inner: TypeId, outer: TypeId) -> bool {
        let mut current = Some(inner);
        while let Some(id) = current {
            if id == outer {
                return true;
            }
            current = self.types[id].enclosing;
        }
        false
    }

    /// Resolve a type name as written inside `from`
    pub fn resolve_type(&self, name: &str, from: TypeId) -> Option<TypeId> {
        self.resolve_in_scope(name, self.types[from].unit, Some(from))
    }

    /// Resolve a type name as written in a compilation unit, optionally inside
    /// a type.
    ///
    /// Lookup order: qualified name, nested types of the enclosing chain,
    /// single-type imports, same package, wildcard imports, then a unique
    /// simple-name match anywhere in the model.
    pub fn resolve_in_scope(
        &self,
        name: &str,
        unit: UnitId,
        enclosing: Option<TypeId>,
    ) -> Option<TypeId> {
        let name = strip_generics(name);
        let name = name.trim_end_matches("[]");
        if name.is_empty() {
            return None;
        }

        if name.contains('.') {
            if let Some(id) = self.find_by_qualified(name) {
                return Some(id);
            }
        }

        let info = &self.units[unit];
        let simple = last_segment(name);
        let head = name.split('.').next().unwrap_or(name);

        // Nested types visible from the enclosing chain, including `Outer.Inner`
        let mut scope = enclosing;
        while let Some(scope_id) = scope {
            let scope_ty = &self.types[scope_id];
            let candidate = format!("{}.{}", scope_ty.qualified_name, name);
            if let Some(id) = self.find_by_qualified(&candidate) {
                return Some(id);
            }
            if scope_ty.name == name {
                return Some(scope_id);
            }
            scope = scope_ty.enclosing;
        }

        for import in &info.imports {
            if import.ends_with(".*") {
                continue;
            }
            if last_segment(import) == head {
                let tail = &name[head.len()..];
                if let Some(id) = self.find_by_qualified(&format!("{}{}", import, tail)) {
                    return Some(id);
                }
            }
        }

        let in_package = match &info.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        };
        if let Some(id) = self.find_by_qualified(&in_package) {
            return Some(id);
        }

        for import in info.imports.iter().filter(|i| i.ends_with(".*")) {
            let package = &import[..import.len() - 2];
            if let Some(id) = self.find_by_qualified(&format!("{}.{}", package, name)) {
                return Some(id);
            }
        }

        match self.find_by_simple(simple) {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Parsed types a unit statically imports `member` from, single-member
    /// imports before on-demand ones
    pub fn static_import_targets(&self, unit: UnitId, member: &str) -> Vec<TypeId> {
        let imports = &self.units[unit].static_imports;
        let single = imports.iter().filter(|i| i.member.as_deref() == Some(member));
        let on_demand = imports.iter().filter(|i| i.member.is_none());

        let mut targets = Vec::new();
        for import in single.chain(on_demand) {
            if let Some(id) = self.resolve_in_scope(&import.type_name, unit, None) {
                if !targets.contains(&id) {
                    targets.push(id);
                }
            }
        }
        targets
    }

    /// Direct supertypes of a type that resolve to parsed declarations
    pub fn resolved_super_types(&self, id: TypeId) -> Vec<TypeId> {
        let ty = &self.types[id];
        let mut seen = HashSet::new();
        ty.super_types()
            .filter_map(|name| self.resolve_type(name, id))
            .filter(|&sup| sup != id && seen.insert(sup))
            .collect()
    }

    /// Methods named `name` with the given arity (any arity when `None`),
    /// looked up on `ty` and then level by level through its supertypes.
    /// Returns the matches of the nearest level that has any.
    pub fn find_methods(&self, ty: TypeId, name: &str, arity: Option<usize>) -> Vec<MethodId> {
        let mut visited = HashSet::new();
        let mut level = vec![ty];

        while !level.is_empty() {
            let mut found = Vec::new();
            let mut next = Vec::new();

            for id in level {
                if !visited.insert(id) {
                    continue;
                }
                found.extend(self.types[id].methods.iter().copied().filter(|&m| {
                    let method = &self.methods[m];
                    method.name == name
                        && arity.map_or(true, |n| method.parameters.len() == n)
                }));
                next.extend(self.resolved_super_types(id));
            }

            if !found.is_empty() {
                return found;
            }
            level = next;
        }

        Vec::new()
    }

    /// All ancestors of a type reachable through parsed declarations, breadth first
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut visited = HashSet::from([id]);
        let mut queue: VecDeque<TypeId> = VecDeque::from([id]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for sup in self.resolved_super_types(current) {
                if visited.insert(sup) {
                    out.push(sup);
                    queue.push_back(sup);
                }
            }
        }

        out
    }
}
