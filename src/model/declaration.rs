use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Index of a type in [`super::JavaModel`]
pub type TypeId = usize;

/// Index of a method in [`super::JavaModel`]
pub type MethodId = usize;

/// Index of a call site in [`super::JavaModel`]
pub type CallId = usize;

/// Index of a compilation unit in [`super::JavaModel`]
pub type UnitId = usize;

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// First line (1-indexed)
    pub line: usize,
    /// Last line (1-indexed, inclusive)
    pub end_line: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, end_line: usize) -> Self {
        Self {
            file,
            line,
            end_line,
        }
    }

    /// Number of lines spanned, inclusive of both ends
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.line) + 1
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Kind of type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    /// Classes, enums and records: the kinds that carry implementations
    pub fn is_class_like(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Enum | TypeKind::Record)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

/// An annotation as written on a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Name as written, without `@` or arguments (may be qualified)
    pub name: String,
    /// Qualified name when it could be resolved through the file's imports
    pub qualified_name: Option<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualified_name: None,
        }
    }

    /// Last segment of the annotation name
    pub fn simple_name(&self) -> &str {
        last_segment(&self.name)
    }

    /// The best known qualified name, falling back to the name as written
    pub fn full_name(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Type as written in source (generics included)
    pub type_name: String,
}

impl Parameter {
    /// Type name with generic arguments and qualification removed, array
    /// brackets kept: `java.util.List<String>[]` becomes `List[]`
    pub fn simple_type_name(&self) -> String {
        simple_type_name(&self.type_name)
    }
}

/// A type declaration (class, interface, enum, record, annotation type)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: TypeId,
    /// Simple name
    pub name: String,
    /// Package-qualified name, nested types joined with `.`
    pub qualified_name: String,
    pub kind: TypeKind,
    /// Compilation unit this type was declared in
    pub unit: UnitId,
    /// Lexically enclosing type for nested declarations
    pub enclosing: Option<TypeId>,
    /// Superclass as written (generics stripped)
    pub superclass: Option<String>,
    /// Implemented interfaces, or extended interfaces for an interface
    pub interfaces: Vec<String>,
    pub annotations: Vec<Annotation>,
    /// Methods declared directly in this type's body
    pub methods: Vec<MethodId>,
    /// Type names mentioned by this type outside its nested type declarations
    pub type_refs: Vec<String>,
    /// Body has no members
    pub empty_body: bool,
    pub location: Location,
}

impl TypeDecl {
    /// Check for an annotation by simple name
    pub fn has_annotation(&self, simple: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple)
    }

    /// All direct supertypes as written: superclass first, then interfaces
    pub fn super_types(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(|s| s.as_str())
    }
}

/// A method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: MethodId,
    pub name: String,
    pub declaring_type: TypeId,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub annotations: Vec<Annotation>,
    pub is_static: bool,
    pub location: Location,
}

impl MethodDecl {
    pub fn has_annotation(&self, simple: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple)
    }

    /// Line count used to rank findings: `end - start + 1`
    pub fn line_count(&self) -> usize {
        self.location.line_count()
    }

    /// `name(T1,T2)` with the parameter types as written
    pub fn descriptor(&self) -> String {
        let params: Vec<&str> = self
            .parameters
            .iter()
            .map(|p| p.type_name.as_str())
            .collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Same name, same arity and same parameter simple-type names in order
    pub fn same_signature(&self, other: &MethodDecl) -> bool {
        self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.simple_type_name() == b.simple_type_name())
    }
}

/// Whether a call site is an invocation or a method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    /// `target.name(args)`
    Invocation,
    /// `Target::name`
    MethodReference,
}

/// What a call site is invoked on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receiver {
    /// Unqualified call: `foo()`
    Implicit,
    /// `this.foo()` or `this::foo`
    This,
    /// `super.foo()` or `super::foo`
    Super,
    /// Static access through a type name: `Util.foo()`, `Util::foo`
    Type(String),
    /// A named variable; its declared type when it is a local, parameter or field
    Variable {
        name: String,
        static_type: Option<String>,
    },
    /// Any other expression (chained calls, array reads, casts, ...)
    Expression,
}

/// A method invocation or method reference expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub id: CallId,
    pub kind: CallKind,
    pub method_name: String,
    /// Argument count; unknown for method references
    pub arg_count: Option<usize>,
    pub receiver: Receiver,
    /// Innermost named type containing the call
    pub enclosing_type: Option<TypeId>,
    pub unit: UnitId,
    pub line: usize,
    /// Target bound by the model's binder, when unambiguous
    pub binding: Option<MethodId>,
}

impl CallSite {
    /// Declaring-type name known from the call site alone, as written
    pub fn static_declaring_type(&self) -> Option<&str> {
        match &self.receiver {
            Receiver::Type(name) => Some(name),
            Receiver::Variable { static_type, .. } => static_type.as_deref(),
            _ => None,
        }
    }
}

/// Package and imports of one parsed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitInfo {
    pub path: PathBuf,
    pub package: Option<String>,
    /// Imports as written, wildcard imports ending in `.*`
    pub imports: Vec<String>,
    #[serde(default)]
    pub static_imports: Vec<StaticImport>,
}

/// `import static Type.member;` or `import static Type.*;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticImport {
    /// Type as written in the import
    pub type_name: String,
    /// Imported member, `None` for on-demand imports
    pub member: Option<String>,
}

impl UnitInfo {
    /// Simple name of the compilation unit: its file name without `.java`
    pub fn simple_name(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// Last `.`-separated segment of a name
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Remove generic arguments from a type as written: `Map<K, List<V>>` → `Map`
pub fn strip_generics(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut depth = 0usize;
    for c in type_name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => out.push(c),
            _ => {}
        }
    }
    out
}

/// Unqualified, non-generic form of a type name, array brackets kept
pub fn simple_type_name(type_name: &str) -> String {
    let stripped = strip_generics(type_name);
    let stripped = stripped.trim_end_matches("...").to_string();
    let (base, arrays) = match stripped.find('[') {
        Some(idx) => stripped.split_at(idx),
        None => (stripped.as_str(), ""),
    };
    format!("{}{}", last_segment(base), arrays)
}
