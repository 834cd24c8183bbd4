/// Trims boundary blank lines and removes the indent shared by all
/// non-blank lines.
///
/// Indentation is counted in characters: a tab and a space both count as
/// one, so blocks mixing the two are stripped by raw width. Whitespace is
/// the ECMAScript set (see [`is_space`]), so a byte-order mark counts as
/// indentation and U+0085 does not.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let start = lines
        .iter()
        .position(|l| !is_blank(l))
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !is_blank(l))
        .map(|i| i + 1)
        .unwrap_or(0);

    if start >= end {
        return String::new();
    }

    let lines = &lines[start..end];

    let min_indent = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_width(l))
        .min();

    match min_indent {
        Some(width) if width > 0 => lines
            .iter()
            .map(|l| strip_chars(l, width))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => lines.join("\n"),
    }
}

/// ECMAScript `WhiteSpace` and `LineTerminator` characters, the set matched
/// by `\s` and removed by `String.prototype.trim` in page scripts.
pub(crate) fn is_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.chars().all(is_space)
}

/// Number of leading whitespace characters.
pub(crate) fn indent_width(line: &str) -> usize {
    line.chars().take_while(|&c| is_space(c)).count()
}

fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_indent_removed() {
        assert_eq!(dedent("    a\n      b\n    c"), "a\n  b\nc");
    }

    #[test]
    fn test_boundary_blank_lines() {
        assert_eq!(dedent("\n\n  x\n\n"), "x");
        assert_eq!(dedent("  \t\n  x\n   \n"), "x");
    }

    #[test]
    fn test_interior_blank_preserved() {
        assert_eq!(dedent("  a\n\n  b"), "a\n\nb");
    }

    #[test]
    fn test_interior_whitespace_line_stripped_by_width() {
        assert_eq!(dedent("  a\n \n  b"), "a\n\nb");
        assert_eq!(dedent("  a\n      \n  b"), "a\n    \nb");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(dedent(""), "");
        assert_eq!(dedent("   \n  \n\t"), "");
        assert_eq!(dedent("\n"), "");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(dedent("    hello  "), "hello  ");
        assert_eq!(dedent("hello"), "hello");
    }

    #[test]
    fn test_zero_min_indent_unchanged() {
        assert_eq!(dedent("fn main() {\n    body();\n}"), "fn main() {\n    body();\n}");
    }

    #[test]
    fn test_blank_lines_do_not_lower_minimum() {
        assert_eq!(dedent("    a\n\n    b\n"), "a\n\nb");
    }

    #[test]
    fn test_mixed_tabs_and_spaces_by_raw_width() {
        assert_eq!(dedent("\ta\n  b"), "a\n b");
        assert_eq!(dedent("\t\ta\n\t\t\tb"), "a\n\tb");
    }

    #[test]
    fn test_trailing_whitespace_kept() {
        assert_eq!(dedent("  a  \n  b\t"), "a  \nb\t");
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(dedent("\r\n  a\r\n  b\r\n"), "a\r\nb\r");
    }

    #[test]
    fn test_multibyte_content() {
        assert_eq!(dedent("  // héllo\n    → next"), "// héllo\n  → next");
    }

    #[test]
    fn test_byte_order_mark_line_is_blank() {
        assert_eq!(dedent("\u{feff}\n  a\n  b"), "a\nb");
        assert_eq!(dedent("\u{feff}  a\n    b"), "a\n b");
    }

    #[test]
    fn test_next_line_char_is_not_whitespace() {
        assert_eq!(dedent("\u{85}a\n  b"), "\u{85}a\n  b");
        assert_eq!(dedent("  \u{85}x\n  y"), "\u{85}x\ny");
        assert!(!is_blank("\u{85}"));
    }

    #[test]
    fn test_unicode_spaces_are_indentation() {
        assert_eq!(dedent("\u{3000}\u{a0}a\n\u{3000}\u{a0}b"), "a\nb");
        assert!(is_blank("\u{2028}\u{202f} \u{0b}"));
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("   x"), 3);
        assert_eq!(indent_width("\t x"), 2);
        assert_eq!(indent_width("x"), 0);
    }
}
