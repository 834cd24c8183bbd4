use serde_json::Value;

/// Content handed to a code block, as the page author wrote it.
///
/// Pages pass strings, numbers, lists and nested elements interchangeably.
/// Everything that is not one of those shapes is kept as [`ContentNode::Empty`]
/// so that flattening stays total.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Text(String),
    Number(f64),
    Sequence(Vec<ContentNode>),
    Element {
        tag: Option<String>,
        children: Box<ContentNode>,
    },
    Empty,
}

impl ContentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, children: ContentNode) -> Self {
        Self::Element {
            tag: Some(tag.into()),
            children: Box::new(children),
        }
    }

    /// Builds a tree from JSON.
    ///
    /// Objects are treated as elements when they carry `children` directly or
    /// under `props` (the shape of a serialized React element). Any other
    /// object, `null` and booleans become [`ContentNode::Empty`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Empty),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from_json).collect()),
            Value::Object(obj) => {
                let children = obj
                    .get("children")
                    .or_else(|| obj.get("props").and_then(|p| p.get("children")));

                let Some(children) = children else {
                    return Self::Empty;
                };

                let tag = obj
                    .get("type")
                    .or_else(|| obj.get("tag"))
                    .and_then(|t| t.as_str())
                    .map(str::to_string);

                Self::Element {
                    tag,
                    children: Box::new(Self::from_json(children)),
                }
            }
            Value::Null | Value::Bool(_) => Self::Empty,
        }
    }

    /// Concatenates every text leaf in document order.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut String) {
        match self {
            Self::Text(s) => out.push_str(s),
            Self::Number(n) => out.push_str(&number_to_text(*n)),
            Self::Sequence(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            Self::Element { children, .. } => children.flatten_into(out),
            Self::Empty => {}
        }
    }
}

impl From<&str> for ContentNode {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ContentNode {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for ContentNode {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ContentNode {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl<T: Into<ContentNode>> From<Vec<T>> for ContentNode {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

// Same text as `String(n)` in page scripts: plain decimal for magnitudes in
// [1e-6, 1e21), shortest exponent form with an explicit sign otherwise.
fn number_to_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n == 0.0 {
        return "0".into();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{}", n);
    }

    let sci = format!("{:e}", n);
    match sci.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => sci,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_leaf_verbatim() {
        assert_eq!(ContentNode::text("  let x = 1;\n").flatten(), "  let x = 1;\n");
    }

    #[test]
    fn test_number_leaf() {
        assert_eq!(ContentNode::from(42i64).flatten(), "42");
        assert_eq!(ContentNode::from(1.5).flatten(), "1.5");
        assert_eq!(ContentNode::from(0.1).flatten(), "0.1");
        assert_eq!(ContentNode::from(-0.0).flatten(), "0");
        assert_eq!(ContentNode::from(3.0).flatten(), "3");
        assert_eq!(ContentNode::from(f64::NAN).flatten(), "NaN");
        assert_eq!(ContentNode::from(f64::NEG_INFINITY).flatten(), "-Infinity");
    }

    #[test]
    fn test_number_exponent_thresholds() {
        assert_eq!(number_to_text(1e21), "1e+21");
        assert_eq!(number_to_text(-2.5e22), "-2.5e+22");
        assert_eq!(number_to_text(1e20), "100000000000000000000");
        assert_eq!(number_to_text(1e-7), "1e-7");
        assert_eq!(number_to_text(1.5e-7), "1.5e-7");
        assert_eq!(number_to_text(1e-6), "0.000001");
        assert_eq!(number_to_text(123456.789), "123456.789");
    }

    #[test]
    fn test_nested_sequence_order() {
        let node = ContentNode::Sequence(vec![
            "a".into(),
            ContentNode::from(vec!["b", "c"]),
            "d".into(),
        ]);
        assert_eq!(node.flatten(), "abcd");
    }

    #[test]
    fn test_element_ignores_tag() {
        let node = ContentNode::element("span", "hello".into());
        assert_eq!(node.flatten(), "hello");
    }

    #[test]
    fn test_empty_contributes_nothing() {
        let node = ContentNode::Sequence(vec!["a".into(), ContentNode::Empty, "b".into()]);
        assert_eq!(node.flatten(), "ab");
        assert_eq!(ContentNode::Sequence(vec![]).flatten(), "");
    }

    #[test]
    fn test_from_json_shapes() {
        let value = json!([
            "const x = ",
            1,
            {"type": "span", "props": {"className": "hl", "children": [";", null]}},
            {"tag": "em", "children": "\n"},
            true,
            {"className": "no-children"}
        ]);
        let node = ContentNode::from_json(&value);
        assert_eq!(node.flatten(), "const x = 1;\n");
    }

    #[test]
    fn test_from_json_element_tag() {
        let node = ContentNode::from_json(&json!({"type": "code", "children": "x"}));
        assert_eq!(
            node,
            ContentNode::Element {
                tag: Some("code".into()),
                children: Box::new(ContentNode::text("x")),
            }
        );
    }

    #[test]
    fn test_from_json_scalars_without_text() {
        assert_eq!(ContentNode::from_json(&json!(null)), ContentNode::Empty);
        assert_eq!(ContentNode::from_json(&json!(false)), ContentNode::Empty);
        assert_eq!(ContentNode::from_json(&json!({})), ContentNode::Empty);
    }
}
