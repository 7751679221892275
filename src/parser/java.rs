use super::common::{
    count_syntax_errors, line_range, named_children, node_text, CompilationUnit, Parser,
};
use crate::error::{ScanError, ScanResult};
use crate::model::{
    last_segment, strip_generics, Annotation, CallKind, CallSite, Location, MethodDecl, Parameter,
    Receiver, StaticImport, TypeDecl, TypeId, TypeKind, UnitInfo,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser as TsParser};

/// Java source code parser using tree-sitter
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_declaration" {
                let mut pkg_cursor = child.walk();
                for pkg_child in child.children(&mut pkg_cursor) {
                    if pkg_child.kind() == "scoped_identifier" || pkg_child.kind() == "identifier" {
                        return Some(node_text(pkg_child, source).to_string());
                    }
                }
            }
        }
        None
    }

    /// Type imports as written (wildcards ending in `.*`) and static imports
    fn extract_imports(&self, root: Node, source: &str) -> (Vec<String>, Vec<StaticImport>) {
        let mut imports = Vec::new();
        let mut static_imports = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() != "import_declaration" {
                continue;
            }

            let mut import_cursor = child.walk();
            let parts: Vec<Node> = child.children(&mut import_cursor).collect();
            let is_static = parts.iter().any(|p| p.kind() == "static");
            let wildcard = parts.iter().any(|p| p.kind() == "asterisk");

            let Some(name) = parts
                .iter()
                .find(|p| p.kind() == "scoped_identifier" || p.kind() == "identifier")
            else {
                continue;
            };
            let text = node_text(*name, source);

            match (is_static, wildcard) {
                (false, false) => imports.push(text.to_string()),
                (false, true) => imports.push(format!("{}.*", text)),
                (true, true) => static_imports.push(StaticImport {
                    type_name: text.to_string(),
                    member: None,
                }),
                (true, false) => {
                    if let Some((type_name, member)) = text.rsplit_once('.') {
                        static_imports.push(StaticImport {
                            type_name: type_name.to_string(),
                            member: Some(member.to_string()),
                        });
                    }
                }
            }
        }

        (imports, static_imports)
    }
}

impl Parser for JavaParser {
    fn parse(&self, path: &Path, contents: &str) -> ScanResult<CompilationUnit> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| ScanError::parse(path, e.to_string()))?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| ScanError::parse(path, "tree-sitter returned no tree"))?;

        let root = tree.root_node();
        let (imports, static_imports) = self.extract_imports(root, contents);
        let info = UnitInfo {
            path: path.to_path_buf(),
            package: self.extract_package(root, contents),
            imports,
            static_imports,
        };

        let mut extractor = Extractor::new(path, contents, info);
        extractor.visit(root);

        let mut unit = extractor.unit;
        unit.syntax_errors = count_syntax_errors(root);

        debug!(
            "Parsed {}: {} types, {} methods, {} call sites",
            path.display(),
            unit.types.len(),
            unit.methods.len(),
            unit.calls.len()
        );

        Ok(unit)
    }
}

/// Variables visible at a point: name to declared type (`None` for `var` and
/// untyped lambda parameters)
type Scope = HashMap<String, Option<String>>;

/// Single pass over one syntax tree collecting declarations and call sites
struct Extractor<'a> {
    path: &'a Path,
    source: &'a str,
    unit: CompilationUnit,

    /// Named types being visited, innermost last
    type_stack: Vec<TypeId>,

    /// Anonymous class bodies open inside the innermost named type
    anonymous: usize,

    scopes: Vec<Scope>,
}

impl<'a> Extractor<'a> {
    fn new(path: &'a Path, source: &'a str, info: UnitInfo) -> Self {
        Self {
            path,
            source,
            unit: CompilationUnit::new(info),
            type_stack: Vec::new(),
            anonymous: 0,
            scopes: vec![Scope::new()],
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.source)
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "class_declaration" => self.visit_type(node, TypeKind::Class),
            "interface_declaration" => self.visit_type(node, TypeKind::Interface),
            "enum_declaration" => self.visit_type(node, TypeKind::Enum),
            "record_declaration" => self.visit_type(node, TypeKind::Record),
            "annotation_type_declaration" => self.visit_type(node, TypeKind::Annotation),
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                self.visit_method(node)
            }
            "class_body" => self.visit_class_body(node),
            "block" | "for_statement" | "catch_clause" | "try_with_resources_statement"
            | "switch_block_statement_group" => self.with_scope(Scope::new(), node),
            "enhanced_for_statement" => {
                let mut scope = Scope::new();
                if let Some(name) = node.child_by_field_name("name") {
                    let ty = node.child_by_field_name("type").map(|t| self.declared_type(t));
                    scope.insert(self.text(name).to_string(), ty.flatten());
                }
                self.with_scope(scope, node);
            }
            "lambda_expression" => {
                let scope = self.lambda_scope(node);
                self.with_scope(scope, node);
            }
            "local_variable_declaration" => {
                self.declare_locals(node);
                self.visit_children(node);
            }
            "catch_formal_parameter" | "resource" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let ty = node
                        .child_by_field_name("type")
                        .or_else(|| named_children(node).into_iter().find(|c| c.kind() == "catch_type"))
                        .and_then(|t| self.declared_type(t));
                    self.declare(self.text(name), ty);
                }
                self.visit_children(node);
            }
            "instanceof_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let ty = node.child_by_field_name("right").and_then(|t| self.declared_type(t));
                    self.declare(self.text(name), ty);
                }
                self.visit_children(node);
            }
            "method_invocation" => {
                self.record_invocation(node);
                self.visit_children(node);
            }
            "method_reference" => {
                self.record_method_reference(node);
                self.visit_children(node);
            }
            "field_access" => {
                if let Some(object) = node.child_by_field_name("object") {
                    if object.kind() == "identifier" {
                        let name = self.text(object);
                        if self.lookup(name).is_none() && starts_uppercase(name) {
                            self.add_type_ref(name);
                        }
                    }
                }
                self.visit_children(node);
            }
            "type_identifier" => {
                let name = self.text(node);
                if name != "var" {
                    self.add_type_ref(name);
                }
            }
            "scoped_type_identifier" => {
                let name = strip_generics(self.text(node));
                self.add_type_ref(&name);
                self.visit_children(node);
            }
            "marker_annotation" | "annotation" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let name = self.text(name);
                    self.add_type_ref(name);
                }
                if let Some(args) = node.child_by_field_name("arguments") {
                    self.visit(args);
                }
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn with_scope(&mut self, scope: Scope, node: Node) {
        self.scopes.push(scope);
        self.visit_children(node);
        self.scopes.pop();
    }

    fn visit_type(&mut self, node: Node, kind: TypeKind) {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.visit_children(node);
            return;
        };

        let name = self.text(name_node).to_string();
        let enclosing = self.type_stack.last().copied();
        let qualified_name = match enclosing {
            Some(outer) => format!("{}.{}", self.unit.types[outer].qualified_name, name),
            None => match &self.unit.info.package {
                Some(pkg) => format!("{}.{}", pkg, name),
                None => name.clone(),
            },
        };

        let body = node.child_by_field_name("body");
        let (line, end_line) = line_range(node);
        let id = self.unit.types.len();

        self.unit.types.push(TypeDecl {
            id,
            name,
            qualified_name,
            kind,
            unit: 0,
            enclosing,
            superclass: self.extract_superclass(node),
            interfaces: self.extract_interfaces(node, kind),
            annotations: self.extract_annotations(node),
            methods: Vec::new(),
            type_refs: Vec::new(),
            empty_body: body.map_or(true, |b| self.is_empty_body(node, b)),
            location: Location::new(self.path.to_path_buf(), line, end_line),
        });

        let mut scope = body.map(|b| self.member_scope(b)).unwrap_or_default();
        if let Some(params) = node.child_by_field_name("parameters") {
            for param in self.extract_parameters(params) {
                scope.insert(param.name, Some(param.type_name));
            }
        }

        self.type_stack.push(id);
        let saved_anonymous = std::mem::replace(&mut self.anonymous, 0);
        self.with_scope(scope, node);
        self.anonymous = saved_anonymous;
        self.type_stack.pop();

        let refs = &mut self.unit.types[id].type_refs;
        refs.sort();
        refs.dedup();
    }

    /// Class bodies reached outside a named type declaration belong to
    /// anonymous classes or enum constants
    fn visit_class_body(&mut self, node: Node) {
        let anonymous = node
            .parent()
            .map_or(false, |p| matches!(p.kind(), "object_creation_expression" | "enum_constant"));

        if anonymous {
            let scope = self.member_scope(node);
            self.anonymous += 1;
            self.with_scope(scope, node);
            self.anonymous -= 1;
        } else {
            self.visit_children(node);
        }
    }

    fn visit_method(&mut self, node: Node) {
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.extract_parameters(p))
            .unwrap_or_default();

        if node.kind() == "method_declaration" && self.anonymous == 0 {
            if let (Some(&declaring_type), Some(name)) =
                (self.type_stack.last(), node.child_by_field_name("name"))
            {
                let (line, end_line) = line_range(node);
                let id = self.unit.methods.len();
                let return_type = node
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string())
                    .filter(|t| t != "void");

                self.unit.methods.push(MethodDecl {
                    id,
                    name: self.text(name).to_string(),
                    declaring_type,
                    parameters: parameters.clone(),
                    return_type,
                    annotations: self.extract_annotations(node),
                    is_static: self.has_modifier(node, "static"),
                    location: Location::new(self.path.to_path_buf(), line, end_line),
                });
                self.unit.types[declaring_type].methods.push(id);
            }
        }

        let scope = parameters
            .into_iter()
            .map(|p| (p.name, Some(p.type_name)))
            .collect();
        self.with_scope(scope, node);
    }

    fn record_invocation(&mut self, node: Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let arg_count = node
            .child_by_field_name("arguments")
            .map(|args| named_children(args).len())
            .unwrap_or(0);

        // `Outer.super.method()` has a `super` token after the object
        let object = node.child_by_field_name("object");
        let mut cursor = node.walk();
        let has_super_token = node.children(&mut cursor).any(|c| c.kind() == "super");
        let qualified_super = has_super_token && object.map(|o| o.kind()) != Some("super");

        let receiver = if qualified_super {
            Receiver::Super
        } else {
            match object {
                None => Receiver::Implicit,
                Some(object) => self.classify_receiver(object),
            }
        };

        self.push_call(
            CallKind::Invocation,
            self.text(name).to_string(),
            Some(arg_count),
            receiver,
            node,
        );
    }

    fn record_method_reference(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let Some(separator) = children.iter().position(|c| c.kind() == "::") else {
            return;
        };

        // `Type::new` is a constructor reference
        let Some(name) = children[separator + 1..]
            .iter()
            .find(|c| c.kind() == "identifier")
        else {
            return;
        };

        let receiver = children[..separator]
            .iter()
            .find(|c| c.is_named() && !super::common::is_comment(**c))
            .map(|target| match target.kind() {
                "type_identifier" | "scoped_type_identifier" | "generic_type" => {
                    Receiver::Type(strip_generics(self.text(*target)))
                }
                _ => self.classify_receiver(*target),
            })
            .unwrap_or(Receiver::Expression);

        self.push_call(
            CallKind::MethodReference,
            self.text(*name).to_string(),
            None,
            receiver,
            node,
        );
    }

    fn push_call(
        &mut self,
        kind: CallKind,
        method_name: String,
        arg_count: Option<usize>,
        receiver: Receiver,
        node: Node,
    ) {
        if let Receiver::Type(name) = &receiver {
            let name = name.clone();
            self.add_type_ref(&name);
        }

        let id = self.unit.calls.len();
        self.unit.calls.push(CallSite {
            id,
            kind,
            method_name,
            arg_count,
            receiver,
            enclosing_type: self.type_stack.last().copied(),
            unit: 0,
            line: node.start_position().row + 1,
            binding: None,
        });
    }

    fn classify_receiver(&self, object: Node) -> Receiver {
        match object.kind() {
            "this" => Receiver::This,
            "super" => Receiver::Super,
            "identifier" => {
                let name = self.text(object);
                match self.lookup(name) {
                    Some(static_type) => Receiver::Variable {
                        name: name.to_string(),
                        static_type: static_type.clone(),
                    },
                    None if starts_uppercase(name) => Receiver::Type(name.to_string()),
                    None => Receiver::Variable {
                        name: name.to_string(),
                        static_type: None,
                    },
                }
            }
            "field_access" => self.classify_field_access(object),
            "parenthesized_expression" => named_children(object)
                .into_iter()
                .next()
                .map(|inner| self.classify_receiver(inner))
                .unwrap_or(Receiver::Expression),
            _ => Receiver::Expression,
        }
    }

    fn classify_field_access(&self, node: Node) -> Receiver {
        let object = node.child_by_field_name("object");
        let field = node.child_by_field_name("field");

        if let (Some(object), Some(field)) = (object, field) {
            if object.kind() == "this" {
                let name = self.text(field);
                return Receiver::Variable {
                    name: name.to_string(),
                    static_type: self.lookup(name).cloned().flatten(),
                };
            }
        }

        // A dotted name such as `com.example.Util` or `Outer.Inner`
        let text = self.text(node);
        let is_dotted_name = text
            .split('.')
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_alphanumeric() || c == '_'));
        let head = text.split('.').next().unwrap_or(text);
        if is_dotted_name && self.lookup(head).is_none() && starts_uppercase(last_segment(text)) {
            return Receiver::Type(text.to_string());
        }

        Receiver::Expression
    }

    fn lookup(&self, name: &str) -> Option<&Option<String>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn declare(&mut self, name: &str, type_name: Option<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), type_name);
        }
    }

    fn declare_locals(&mut self, node: Node) {
        let ty = node
            .child_by_field_name("type")
            .and_then(|t| self.declared_type(t));
        let mut cursor = node.walk();
        let names: Vec<&str> = node
            .children_by_field_name("declarator", &mut cursor)
            .filter_map(|d| d.child_by_field_name("name"))
            .map(|n| self.text(n))
            .collect();
        for name in names {
            self.declare(name, ty.clone());
        }
    }

    /// Declared type of a variable; `var` is left unknown
    fn declared_type(&self, type_node: Node) -> Option<String> {
        let text = self.text(type_node);
        if text == "var" {
            None
        } else {
            Some(text.to_string())
        }
    }

    fn lambda_scope(&self, node: Node) -> Scope {
        let mut scope = Scope::new();
        let Some(params) = node.child_by_field_name("parameters") else {
            return scope;
        };
        match params.kind() {
            "identifier" => {
                scope.insert(self.text(params).to_string(), None);
            }
            "formal_parameters" => {
                for param in self.extract_parameters(params) {
                    scope.insert(param.name, Some(param.type_name));
                }
            }
            _ => {
                for ident in named_children(params) {
                    if ident.kind() == "identifier" {
                        scope.insert(self.text(ident).to_string(), None);
                    }
                }
            }
        }
        scope
    }

    /// Fields declared directly in a type body, visible to all its members
    fn member_scope(&self, body: Node) -> Scope {
        let mut scope = Scope::new();
        let mut members = named_children(body);
        if let Some(decls) = members
            .iter()
            .find(|m| m.kind() == "enum_body_declarations")
            .copied()
        {
            members.extend(named_children(decls));
        }

        for member in members {
            if !matches!(member.kind(), "field_declaration" | "constant_declaration") {
                continue;
            }
            let ty = member
                .child_by_field_name("type")
                .map(|t| self.text(t).to_string());
            let mut cursor = member.walk();
            for declarator in member.children_by_field_name("declarator", &mut cursor) {
                if let Some(name) = declarator.child_by_field_name("name") {
                    scope.insert(self.text(name).to_string(), ty.clone());
                }
            }
        }
        scope
    }

    fn is_empty_body(&self, decl: Node, body: Node) -> bool {
        let has_components = decl
            .child_by_field_name("parameters")
            .map_or(false, |p| !named_children(p).is_empty());
        if has_components {
            return false;
        }

        named_children(body).iter().all(|member| {
            member.kind() == "enum_body_declarations" && named_children(*member).is_empty()
        })
    }

    fn extract_parameters(&self, params: Node) -> Vec<Parameter> {
        let mut out = Vec::new();
        for param in named_children(params) {
            match param.kind() {
                "formal_parameter" => {
                    if let (Some(ty), Some(name)) = (
                        param.child_by_field_name("type"),
                        param.child_by_field_name("name"),
                    ) {
                        out.push(Parameter {
                            name: self.text(name).to_string(),
                            type_name: self.text(ty).to_string(),
                        });
                    }
                }
                "spread_parameter" => {
                    let parts = named_children(param);
                    let ty = parts
                        .iter()
                        .find(|p| !matches!(p.kind(), "modifiers" | "variable_declarator"));
                    let name = parts
                        .iter()
                        .find(|p| p.kind() == "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"));
                    if let (Some(ty), Some(name)) = (ty, name) {
                        // Varargs compare equal to the array form
                        out.push(Parameter {
                            name: self.text(name).to_string(),
                            type_name: format!("{}[]", self.text(*ty)),
                        });
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn extract_superclass(&self, node: Node) -> Option<String> {
        let superclass = node.child_by_field_name("superclass")?;
        named_children(superclass)
            .into_iter()
            .next()
            .map(|ty| strip_generics(self.text(ty)))
    }

    fn extract_interfaces(&self, node: Node, kind: TypeKind) -> Vec<String> {
        let list_parent = if kind == TypeKind::Interface {
            named_children(node)
                .into_iter()
                .find(|c| c.kind() == "extends_interfaces")
        } else {
            node.child_by_field_name("interfaces")
        };

        let Some(list_parent) = list_parent else {
            return Vec::new();
        };

        named_children(list_parent)
            .into_iter()
            .filter(|c| c.kind() == "type_list")
            .flat_map(named_children)
            .map(|ty| strip_generics(self.text(ty)))
            .collect()
    }

    fn extract_annotations(&self, node: Node) -> Vec<Annotation> {
        let Some(modifiers) = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "modifiers")
        else {
            return Vec::new();
        };

        named_children(modifiers)
            .into_iter()
            .filter(|m| matches!(m.kind(), "marker_annotation" | "annotation"))
            .filter_map(|m| m.child_by_field_name("name"))
            .map(|name| {
                let name = self.text(name);
                let mut annotation = Annotation::new(name);
                annotation.qualified_name = self.qualify_annotation(name);
                annotation
            })
            .collect()
    }

    fn qualify_annotation(&self, name: &str) -> Option<String> {
        if name.contains('.') {
            return Some(name.to_string());
        }
        self.unit
            .info
            .imports
            .iter()
            .find(|import| !import.ends_with(".*") && last_segment(import) == name)
            .cloned()
    }

    fn has_modifier(&self, node: Node, modifier: &str) -> bool {
        named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "modifiers")
            .any(|m| {
                let mut cursor = m.walk();
                let found = m.children(&mut cursor).any(|c| c.kind() == modifier);
                found
            })
    }

    fn add_type_ref(&mut self, name: &str) {
        if let Some(&current) = self.type_stack.last() {
            self.unit.types[current].type_refs.push(name.to_string());
        }
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CompilationUnit {
        JavaParser::new()
            .parse(Path::new("src/Test.java"), source)
            .unwrap()
    }

    #[test]
    fn test_parse_simple_class() {
        let unit = parse(
            r#"
            package com.example;

            public class MyClass {
                public void myMethod() {}
            }
        "#,
        );

        assert_eq!(unit.info.package.as_deref(), Some("com.example"));
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].qualified_name, "com.example.MyClass");
        assert_eq!(unit.methods.len(), 1);
        assert_eq!(unit.methods[0].name, "myMethod");
        assert!(!unit.has_errors());
    }

    #[test]
    fn test_parse_imports() {
        let unit = parse(
            r#"
            import com.example.Foo;
            import com.example.util.*;
            import static com.example.Bar.helper;
            import static com.example.Consts.*;

            class Test {}
        "#,
        );

        assert_eq!(unit.info.imports, vec!["com.example.Foo", "com.example.util.*"]);
        assert_eq!(
            unit.info.static_imports,
            vec![
                StaticImport {
                    type_name: "com.example.Bar".to_string(),
                    member: Some("helper".to_string()),
                },
                StaticImport {
                    type_name: "com.example.Consts".to_string(),
                    member: None,
                },
            ]
        );
    }

    #[test]
    fn test_supertypes_and_annotations() {
        let unit = parse(
            r#"
            package p;
            import org.springframework.stereotype.Service;

            @Service
            public class Impl extends Base<String> implements Greeter, Comparable<Impl> {
                @PostConstruct
                void init() {}
            }

            interface Greeter extends Named, Comparable<Greeter> { void greet(); }
        "#,
        );

        let impl_ty = &unit.types[0];
        assert_eq!(impl_ty.superclass.as_deref(), Some("Base"));
        assert_eq!(impl_ty.interfaces, vec!["Greeter", "Comparable"]);
        assert!(impl_ty.has_annotation("Service"));
        assert_eq!(
            impl_ty.annotations[0].full_name(),
            "org.springframework.stereotype.Service"
        );

        let greeter = &unit.types[1];
        assert_eq!(greeter.kind, TypeKind::Interface);
        assert_eq!(greeter.interfaces, vec!["Named", "Comparable"]);

        assert!(unit.methods[0].has_annotation("PostConstruct"));
    }

    #[test]
    fn test_nested_types_and_line_ranges() {
        let unit = parse(
            "package p;\nclass Outer {\n  static class Inner {\n    void a() {\n    }\n  }\n}\n",
        );

        assert_eq!(unit.types[1].qualified_name, "p.Outer.Inner");
        assert_eq!(unit.types[1].enclosing, Some(0));
        let a = &unit.methods[0];
        assert_eq!(a.declaring_type, 1);
        assert_eq!((a.location.line, a.location.end_line), (4, 5));
        assert_eq!(a.line_count(), 2);
    }

    #[test]
    fn test_empty_body() {
        let unit = parse(
            r#"
            class Empty {}
            class Commented { /* nothing */ }
            class Full { int x; }
            enum NoConstants {}
            record Point(int x, int y) {}
        "#,
        );

        let empty: Vec<bool> = unit.types.iter().map(|t| t.empty_body).collect();
        assert_eq!(empty, vec![true, true, false, true, false]);
    }

    #[test]
    fn test_receivers() {
        let unit = parse(
            r#"
            class Caller {
                private Repo repo;

                void run(Greeter g) {
                    Helper h = new Helper();
                    var v = make();
                    g.greet();
                    h.help(1, 2);
                    this.repo.save(x);
                    Util.check();
                    this.local();
                    super.parent();
                    v.go();
                    make().chain();
                    local();
                }
            }
        "#,
        );

        let receivers: Vec<(&str, &Receiver, Option<usize>)> = unit
            .calls
            .iter()
            .map(|c| (c.method_name.as_str(), &c.receiver, c.arg_count))
            .collect();

        let find = |name: &str| receivers.iter().find(|r| r.0 == name).unwrap();

        assert_eq!(
            find("greet").1,
            &Receiver::Variable {
                name: "g".to_string(),
                static_type: Some("Greeter".to_string())
            }
        );
        assert_eq!(find("help").2, Some(2));
        assert_eq!(
            find("save").1,
            &Receiver::Variable {
                name: "repo".to_string(),
                static_type: Some("Repo".to_string())
            }
        );
        assert_eq!(find("check").1, &Receiver::Type("Util".to_string()));
        assert_eq!(find("local").1, &Receiver::This);
        assert_eq!(find("parent").1, &Receiver::Super);
        assert_eq!(
            find("go").1,
            &Receiver::Variable {
                name: "v".to_string(),
                static_type: None
            }
        );
        assert_eq!(find("chain").1, &Receiver::Expression);
        assert!(receivers
            .iter()
            .any(|r| r.0 == "local" && r.1 == &Receiver::Implicit));
    }

    #[test]
    fn test_method_references() {
        let unit = parse(
            r#"
            class Refs {
                void run(List<String> items) {
                    items.forEach(Printer::print);
                    items.forEach(this::handle);
                    items.stream().map(Item::new);
                }
            }
        "#,
        );

        let refs: Vec<&CallSite> = unit
            .calls
            .iter()
            .filter(|c| c.kind == CallKind::MethodReference)
            .collect();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].method_name, "print");
        assert_eq!(refs[0].receiver, Receiver::Type("Printer".to_string()));
        assert_eq!(refs[0].arg_count, None);
        assert_eq!(refs[1].receiver, Receiver::This);
    }

    #[test]
    fn test_constructor_calls_not_recorded() {
        let unit = parse(
            r#"
            class Child extends Parent {
                Child() { super(); }
                Child(int x) { this(); }
            }
        "#,
        );

        assert!(unit.calls.is_empty());
        assert!(unit.methods.is_empty());
    }

    #[test]
    fn test_anonymous_class_methods_not_declared() {
        let unit = parse(
            r#"
            class Host {
                Runnable r = new Runnable() {
                    public void run() { work(); }
                };
                void work() {}
            }
        "#,
        );

        let names: Vec<&str> = unit.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["work"]);
        assert_eq!(unit.calls[0].enclosing_type, Some(0));
    }

    #[test]
    fn test_type_refs_stay_with_declaring_type() {
        let unit = parse(
            r#"
            class Outer {
                List<Helper> helpers;
                static class Inner { Widget w; }
                void f() { Factory.create(); Color c = Color.RED; }
            }
        "#,
        );

        let outer = &unit.types[0].type_refs;
        assert!(outer.contains(&"Helper".to_string()));
        assert!(outer.contains(&"List".to_string()));
        assert!(outer.contains(&"Factory".to_string()));
        assert!(outer.contains(&"Color".to_string()));
        assert!(!outer.contains(&"Widget".to_string()));
        assert!(unit.types[1].type_refs.contains(&"Widget".to_string()));
    }

    #[test]
    fn test_varargs_and_static() {
        let unit = parse(
            r#"
            class Util {
                static String join(String sep, String... parts) { return null; }
            }
        "#,
        );

        let join = &unit.methods[0];
        assert!(join.is_static);
        assert_eq!(join.descriptor(), "join(String,String[])");
        assert_eq!(join.return_type.as_deref(), Some("String"));
    }

    #[test]
    fn test_syntax_errors_counted() {
        let unit = parse("class Broken { void f( { }");
        assert!(unit.has_errors());
    }
}
