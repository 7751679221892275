//! Usage analysis: exclusion policy, indexes, resolvers and ranking.

pub mod class_usage;
pub mod exclusion;
pub mod implementers;
pub mod method_usage;
pub mod ranker;
pub mod regex_usage;
pub mod signature;

pub use class_usage::ClassUsageResolver;
pub use exclusion::ExclusionPolicy;
pub use implementers::ImplementerIndex;
pub use method_usage::{MethodUsageResolver, UsedSet};
pub use ranker::Ranker;
pub use regex_usage::RegexUsageEngine;
pub use signature::{SignatureIndex, SignatureKey};

use crate::model::Location;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A type believed to be unused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Qualified name of the unused type
    pub original_class: String,

    /// Types known to reference it, when any were recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_by: Option<BTreeSet<String>>,

    /// Where the type is declared, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Reference {
    pub fn new(original_class: impl Into<String>) -> Self {
        Self {
            original_class: original_class.into(),
            referenced_by: None,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Record a referencing type
    pub fn append(&mut self, referencing: impl Into<String>) {
        self.referenced_by
            .get_or_insert_with(BTreeSet::new)
            .insert(referencing.into());
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original_class)
    }
}

/// A method believed to be unused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodReference {
    #[serde(flatten)]
    pub reference: Reference,

    /// Simple method name
    pub method: String,

    /// `name(T1,T2)` with parameter types as written
    pub descriptor: String,

    /// `end_line - start_line + 1`
    pub method_lines: usize,
}

impl MethodReference {
    pub fn original_class(&self) -> &str {
        &self.reference.original_class
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} ({} lines)",
            self.reference.original_class, self.method, self.method_lines
        )
    }
}

/// Outcome of one scan: findings, an explicit "nothing found" marker, or an
/// error marker carrying the cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ScanReport<T> {
    Findings(Vec<T>),
    NoIssues,
    Failed { message: String },
}

impl<T> ScanReport<T> {
    /// `NoIssues` for an empty list
    pub fn from_findings(findings: Vec<T>) -> Self {
        if findings.is_empty() {
            ScanReport::NoIssues
        } else {
            ScanReport::Findings(findings)
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ScanReport::Failed {
            message: message.into(),
        }
    }

    pub fn findings(&self) -> &[T] {
        match self {
            ScanReport::Findings(items) => items,
            _ => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScanReport::Failed { .. })
    }

    pub fn len(&self) -> usize {
        self.findings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings().is_empty()
    }
}
