mod loader;

pub use loader::{Config, ExclusionConfig, ScanConfig};
