pub mod config;
pub mod snippet;
pub mod source;

pub use config::{Config, ScanConfig};
pub use snippet::{ContentNode, dedent, normalize, normalize_text};
