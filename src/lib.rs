//! bigclean - unused class and method detection for Java source trees
//!
//! Two engines are available for classes:
//!
//! 1. **Regex** - a class is used when another file matches one of a fixed
//!    set of textual reference shapes (import, `new`, generic argument, ...)
//! 2. **AST** - sources are parsed with tree-sitter into a [`model::JavaModel`]
//!    and a class is used when another type mentions it
//!
//! Methods are always analysed on the model: call sites are resolved through
//! symbol binding, a signature index and interface-to-implementer
//! propagation, then the unused remainder is filtered and ranked by size.

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scan;

pub use analysis::{MethodReference, Reference, ScanReport};
pub use config::Config;
pub use discovery::FileFinder;
pub use error::{ScanError, ScanResult};
pub use report::{ReportFormat, Reporter};
pub use scan::{scan_unused_classes, scan_unused_methods, ScanMode, Scanner};
