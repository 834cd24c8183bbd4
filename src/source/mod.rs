//! Tooling for `CodeBlock` samples embedded in documentation page sources.

mod blocks;
mod discover;
mod fix;
mod rules;
mod scan;

pub use blocks::{CodeBlockSpan, find_code_blocks};
pub use discover::discover_files;
pub use fix::{FixOutcome, fix_block, fix_paths, fix_source};
pub use rules::Rules;
pub use scan::{BlockReport, ScanIssue, scan_block, scan_paths, scan_source};
