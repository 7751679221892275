//! Which declarations are analysis candidates and which findings are dropped.
//!
//! Every rule is driven by one of the tables below; configuration can append
//! entries but never remove the built-in ones.

use crate::config::ExclusionConfig;
use crate::model::{MethodDecl, TypeDecl, TypeKind};
use std::path::Path;

/// File-name suffixes (before `.java`) that are never regex candidates
pub const FILE_SUFFIXES: &[&str] = &[
    "Impl",
    "Controller",
    "Configuration",
    "Pointcut",
    "Aspect",
    "Test",
    "Tester",
    "Strategy",
];

/// Framework-bean annotations removing a type from class candidates
pub const BEAN_ANNOTATIONS: &[&str] = &[
    "Component",
    "Service",
    "Controller",
    "RestController",
    "Aspect",
    "Configuration",
    "Repository",
    "Mapper",
];

/// Annotations keeping a class out of the implementer index
pub const CONFIGURATION_ANNOTATIONS: &[&str] = &["Configuration", "ConfigurationProperties"];

/// Declaring-type annotations suppressing unused-method findings
pub const EXCLUDED_TYPE_ANNOTATIONS: &[&str] = &[
    "Controller",
    "RestController",
    "RestControllerAdvice",
    "ControllerAdvice",
    "Aspect",
    "Configuration",
];

/// Fragments of a declaring type's qualified name suppressing findings
pub const EXCLUDED_NAME_FRAGMENTS: &[&str] = &["Controller", "Test", "FallbackFactory"];

/// Lifecycle-callback annotations on methods
pub const LIFECYCLE_ANNOTATIONS: &[&str] = &["PostConstruct", "PreDestroy"];

/// Qualified-name prefixes of mapping-framework annotations
pub const MAPPING_ANNOTATION_PREFIXES: &[&str] = &["org.mapstruct"];

/// Declaring types whose qualified name ends with this are builders
pub const BUILDER_SUFFIX: &str = "Builder";

/// Lifecycle hook method names called by dependency-injection containers
pub const LIFECYCLE_METHODS: &[&str] = &["afterPropertiesSet"];

/// Container-style method names not resolved against user code
pub const CONTAINER_METHOD_NAMES: &[&str] = &[
    "get",
    "set",
    "add",
    "remove",
    "contains",
    "size",
    "clear",
    "isEmpty",
    "put",
    "getOrDefault",
    "computeIfAbsent",
    "computeIfPresent",
    "compute",
    "merge",
    "replaceAll",
    "forEach",
    "entrySet",
    "values",
    "keySet",
    "stream",
    "parallelStream",
];

/// Declaring-type name markers of infrastructure clients whose container-style
/// calls are still resolved
pub const INFRASTRUCTURE_MARKERS: &[&str] = &["redis", "Redis"];

/// Why an unused method is left out of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodExclusion {
    /// Declaring type's qualified name contains an excluded fragment
    ExcludedName,
    /// Declaring type carries a controller, advice, aspect or configuration annotation
    ExcludedTypeAnnotation,
    /// Method carries a lifecycle-callback annotation
    LifecycleAnnotation,
    /// Declaring type carries a mapping-framework annotation
    MappingFramework,
    /// Declaring type is a builder
    Builder,
    /// Declaring type is an interface or annotation type
    NotAClass,
    /// Method is a container lifecycle hook
    LifecycleMethod,
}

/// Candidate and exclusion predicates for one scan
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    file_suffixes: Vec<String>,
    bean_annotations: Vec<String>,
    configuration_annotations: Vec<String>,
    type_annotations: Vec<String>,
    name_fragments: Vec<String>,
    lifecycle_annotations: Vec<String>,
    mapping_prefixes: Vec<String>,
    lifecycle_methods: Vec<String>,
    container_methods: Vec<String>,
    infrastructure_markers: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::from_config(&ExclusionConfig::default())
    }
}

fn merged(defaults: &[&str], extra: &[String]) -> Vec<String> {
    defaults
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned())
        .collect()
}

fn has_any(names: &[String], mut has: impl FnMut(&str) -> bool) -> bool {
    names.iter().any(|name| has(name))
}

impl ExclusionPolicy {
    pub fn from_config(extra: &ExclusionConfig) -> Self {
        Self {
            file_suffixes: merged(FILE_SUFFIXES, &extra.file_suffixes),
            bean_annotations: merged(BEAN_ANNOTATIONS, &extra.bean_annotations),
            configuration_annotations: merged(CONFIGURATION_ANNOTATIONS, &[]),
            type_annotations: merged(EXCLUDED_TYPE_ANNOTATIONS, &extra.type_annotations),
            name_fragments: merged(EXCLUDED_NAME_FRAGMENTS, &[]),
            lifecycle_annotations: merged(LIFECYCLE_ANNOTATIONS, &extra.lifecycle_annotations),
            mapping_prefixes: merged(MAPPING_ANNOTATION_PREFIXES, &[]),
            lifecycle_methods: merged(LIFECYCLE_METHODS, &extra.lifecycle_methods),
            container_methods: merged(CONTAINER_METHOD_NAMES, &extra.container_methods),
            infrastructure_markers: merged(INFRASTRUCTURE_MARKERS, &extra.infrastructure_markers),
        }
    }

    /// Regex mode: files whose name ends in an excluded suffix are never
    /// candidates but still belong to the referencing universe
    pub fn is_excluded_file(&self, path: &Path) -> bool {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return false;
        };
        self.file_suffixes.iter().any(|suffix| stem.ends_with(suffix.as_str()))
    }

    /// AST class mode: framework-managed and empty types are not candidates
    pub fn is_class_candidate(&self, ty: &TypeDecl) -> bool {
        !ty.empty_body && !has_any(&self.bean_annotations, |a| ty.has_annotation(a))
    }

    /// Classes that populate the implementer index
    pub fn is_implementer(&self, ty: &TypeDecl) -> bool {
        ty.kind.is_class_like()
            && !ty.empty_body
            && !has_any(&self.configuration_annotations, |a| ty.has_annotation(a))
    }

    /// Container-style calls are skipped unless the declaring type is
    /// unknown or names an infrastructure client
    pub fn skips_container_call(&self, method_name: &str, declaring_type: Option<&str>) -> bool {
        if !self.container_methods.iter().any(|m| m == method_name) {
            return false;
        }
        match declaring_type {
            Some(ty) => !self
                .infrastructure_markers
                .iter()
                .any(|marker| ty.contains(marker.as_str())),
            None => false,
        }
    }

    /// The first rule that drops an unused method from the report
    pub fn method_exclusion(
        &self,
        method: &MethodDecl,
        declaring: &TypeDecl,
    ) -> Option<MethodExclusion> {
        let qualified = declaring.qualified_name.as_str();

        if self
            .name_fragments
            .iter()
            .any(|fragment| qualified.contains(fragment.as_str()))
        {
            return Some(MethodExclusion::ExcludedName);
        }
        if has_any(&self.type_annotations, |a| declaring.has_annotation(a)) {
            return Some(MethodExclusion::ExcludedTypeAnnotation);
        }
        if has_any(&self.lifecycle_annotations, |a| method.has_annotation(a)) {
            return Some(MethodExclusion::LifecycleAnnotation);
        }
        if declaring.annotations.iter().any(|a| {
            self.mapping_prefixes
                .iter()
                .any(|prefix| a.full_name().starts_with(prefix.as_str()))
        }) {
            return Some(MethodExclusion::MappingFramework);
        }
        if qualified.ends_with(BUILDER_SUFFIX) {
            return Some(MethodExclusion::Builder);
        }
        if matches!(declaring.kind, TypeKind::Interface | TypeKind::Annotation) {
            return Some(MethodExclusion::NotAClass);
        }
        if self.lifecycle_methods.iter().any(|m| *m == method.name) {
            return Some(MethodExclusion::LifecycleMethod);
        }
        None
    }
}
