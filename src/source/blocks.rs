use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// `<CodeBlock language="ts">{`...`}</CodeBlock>`; group 1 is the literal body.
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<CodeBlock[^>]*>\s*\{`(.*?)`\}\s*</CodeBlock>").unwrap()
});

/// A `CodeBlock` template literal found in a page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockSpan<'a> {
    /// 1-based line of the opening `<CodeBlock` tag.
    pub line: usize,
    /// Byte range of the literal body within the source.
    pub body_range: Range<usize>,
    pub body: &'a str,
}

pub fn find_code_blocks(source: &str) -> Vec<CodeBlockSpan<'_>> {
    let mut line = 1;
    let mut counted_to = 0;

    CODE_BLOCK_RE
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;

            line += source[counted_to..whole.start()].matches('\n').count();
            counted_to = whole.start();

            Some(CodeBlockSpan {
                line,
                body_range: body.range(),
                body: body.as_str(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"export default function Page() {
  return (
    <Section title="Install">
      <CodeBlock language="bash">{`npm install sdk`}</CodeBlock>
      <p>Then:</p>
      <CodeBlock language="typescript">
        {`
          const a = 1;
        `}
      </CodeBlock>
    </Section>
  );
}
"#;

    #[test]
    fn test_finds_blocks_in_order() {
        let blocks = find_code_blocks(PAGE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].body, "npm install sdk");
        assert_eq!(blocks[0].line, 4);
        assert_eq!(blocks[1].line, 6);
        assert_eq!(blocks[1].body.trim(), "const a = 1;");
    }

    #[test]
    fn test_body_range_points_into_source() {
        let blocks = find_code_blocks(PAGE);
        for block in &blocks {
            assert_eq!(&PAGE[block.body_range.clone()], block.body);
        }
    }

    #[test]
    fn test_ignores_other_components() {
        let source = "<Section>{`not code`}</Section>\n<CodeBlock>plain</CodeBlock>";
        assert!(find_code_blocks(source).is_empty());
    }

    #[test]
    fn test_empty_body() {
        let blocks = find_code_blocks("<CodeBlock>{``}</CodeBlock>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "");
    }
}
