mod common;
mod java;

pub use common::{CompilationUnit, Parser};
pub use java::JavaParser;
