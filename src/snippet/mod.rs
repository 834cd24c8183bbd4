mod content;
mod dedent;

pub use content::ContentNode;
pub use dedent::dedent;
pub(crate) use dedent::{indent_width, is_blank};

/// Flattens `content` and removes its common indentation.
///
/// The result has no leading or trailing blank lines, and at least one of
/// its lines starts without whitespace unless it is empty.
pub fn normalize(content: &ContentNode) -> String {
    dedent(&content.flatten())
}

pub fn normalize_text(text: &str) -> String {
    dedent(text)
}
