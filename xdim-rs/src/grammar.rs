//! Layout grammar.
//!
//! ```text
//! layout      := group+
//! group       := "[" partlist "]"
//! partlist    := part ("," part)*
//! part        := identifier | "(" partlist ")"
//! identifier  := letter+
//! ```
//!
//! Parenthesised sub-groups are reserved unless [`Grouping::Allowed`] is set,
//! in which case they produce nested [`Node::Matrix`] parts.

use super::*;
use std::collections::HashSet;

/// Whether parenthesised sub-groups are accepted in raw layout strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Grouping {
    /// `(` and `)` are rejected as invalid characters.
    #[default]
    Reserved,
    /// `(` and `)` group parts into nested matrices.
    Allowed,
}

/// Options controlling how layout strings are validated and parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    grouping: Grouping,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grouping policy.
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }
}

/// Checks a layout string against the accepted alphabet with default options.
pub fn validate(layout: &str) -> Result<()> {
    validate_with(layout, &ParseOptions::default())
}

/// Checks a layout string against the accepted alphabet: letters, spaces,
/// commas and square brackets (plus parentheses when grouping is allowed).
/// Every offending occurrence is reported.
pub fn validate_with(layout: &str, options: &ParseOptions) -> Result<()> {
    let grouping = options.grouping == Grouping::Allowed;
    let invalid = layout
        .chars()
        .filter(|&c| match c {
            'a'..='z' | 'A'..='Z' | ' ' | ',' | '[' | ']' => false,
            '(' | ')' => !grouping,
            _ => true,
        })
        .collect::<Vec<_>>();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(LayoutError::InvalidCharacter(invalid))
    }
}

/// Parses a layout string with default options.
pub fn parse(layout: &str) -> Result<Layout> {
    parse_with(layout, &ParseOptions::default())
}

/// Parses a layout string into a [`Layout`].
pub fn parse_with(layout: &str, options: &ParseOptions) -> Result<Layout> {
    validate_with(layout, options)?;

    let mut nodes = Vec::new();
    let mut rest = layout.trim_start();
    while let Some(c) = rest.chars().next() {
        if c != '[' {
            return Err(LayoutError::malformed(
                layout,
                format!("expected `[`, found `{c}`"),
            ));
        }
        let close = rest
            .find(']')
            .ok_or_else(|| LayoutError::malformed(layout, "unmatched `[`"))?;
        let inner = &rest[1..close];
        if inner.contains('[') {
            return Err(LayoutError::malformed(layout, "nested `[`"));
        }
        nodes.push(parse_group(layout, inner)?);
        rest = rest[close + 1..].trim_start();
    }

    if nodes.is_empty() {
        return Err(LayoutError::malformed(layout, "no bracketed group"));
    }

    let layout_value = Layout::new(nodes);
    let mut seen = HashSet::new();
    if let Some(dup) = layout_value.dims().into_iter().find(|dim| !seen.insert(*dim)) {
        return Err(LayoutError::malformed(
            layout,
            format!("dimension `{dup}` is referenced more than once"),
        ));
    }

    log::trace!(
        "parsed layout `{layout}` with summary {:?}",
        layout_value.summary()
    );
    Ok(layout_value)
}

/// Part under construction inside one group.
#[derive(Default)]
struct Pending {
    ident: String,
    ident_closed: bool,
    group: Option<Node>,
}

impl Pending {
    fn is_started(&self) -> bool {
        !self.ident.is_empty() || self.group.is_some()
    }

    fn take(&mut self, layout: &str) -> Result<Node> {
        let pending = std::mem::take(self);
        match pending.group {
            Some(node) => Ok(node),
            None if !pending.ident.is_empty() => Ok(Node::Vector { dim: pending.ident }),
            None => Err(LayoutError::malformed(layout, "empty part")),
        }
    }
}

fn group_node(mut parts: Vec<Node>) -> Node {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        Node::Matrix { parts }
    }
}

/// Parses the inside of one `[...]` group. Open parentheses are tracked on an
/// explicit stack of part lists.
fn parse_group(layout: &str, inner: &str) -> Result<Node> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut pending = Pending::default();

    for c in inner.chars() {
        match c {
            ' ' => {
                if !pending.ident.is_empty() {
                    pending.ident_closed = true;
                }
            }
            ',' => {
                let part = pending.take(layout)?;
                if let Some(parts) = stack.last_mut() {
                    parts.push(part);
                }
            }
            '(' => {
                if pending.is_started() {
                    return Err(LayoutError::malformed(layout, "missing `,` before `(`"));
                }
                stack.push(Vec::new());
            }
            ')' => {
                if stack.len() == 1 {
                    return Err(LayoutError::malformed(layout, "unmatched `)`"));
                }
                let part = pending.take(layout)?;
                if let Some(mut parts) = stack.pop() {
                    parts.push(part);
                    pending.group = Some(group_node(parts));
                }
            }
            _ => {
                if pending.group.is_some() || pending.ident_closed {
                    return Err(LayoutError::malformed(
                        layout,
                        format!("missing `,` before `{c}`"),
                    ));
                }
                pending.ident.push(c);
            }
        }
    }

    if stack.len() != 1 {
        return Err(LayoutError::malformed(layout, "unmatched `(`"));
    }
    let part = pending.take(layout)?;
    let mut parts = stack.pop().unwrap_or_default();
    parts.push(part);
    Ok(group_node(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> ParseOptions {
        ParseOptions::new().with_grouping(Grouping::Allowed)
    }

    #[test]
    fn test_validate() {
        assert!(validate("[band][row,column]").is_ok());
        assert_eq!(
            validate("[band,(row,column)]"),
            Err(LayoutError::InvalidCharacter(vec!['(', ')']))
        );
        assert_eq!(
            validate("[band1][row_2]"),
            Err(LayoutError::InvalidCharacter(vec!['1', '_', '2']))
        );
        assert!(validate_with("[band,(row,column)]", &grouped()).is_ok());
    }

    #[test]
    fn test_parse_vectors_and_matrices() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        assert_eq!(
            layout.nodes(),
            &[
                Node::vector("band"),
                Node::matrix(vec![Node::vector("row"), Node::vector("column")])
            ]
        );

        let flat = parse("[row,column,band]")?;
        assert_eq!(flat.summary(), &[3]);

        let cube = parse("[band][row][column]")?;
        assert_eq!(cube.summary(), &[1, 1, 1]);
        Ok(())
    }

    #[test]
    fn test_parse_tolerates_spaces() -> Result<()> {
        assert_eq!(parse(" [ band ] [ row , column ] ")?, parse("[band][row,column]")?);
        Ok(())
    }

    #[test]
    fn test_parse_nested_groups() -> Result<()> {
        let layout = parse_with("[band,(row,column)]", &grouped())?;
        assert_eq!(
            layout.nodes(),
            &[Node::matrix(vec![
                Node::vector("band"),
                Node::matrix(vec![Node::vector("row"), Node::vector("column")])
            ])]
        );

        // Redundant parentheses collapse.
        assert_eq!(
            parse_with("[((row,column))]", &grouped())?,
            parse("[row,column]")?
        );
        assert_eq!(parse_with("[(band)][row]", &grouped())?, parse("[band][row]")?);
        Ok(())
    }

    #[test]
    fn test_parse_deep_nesting() -> Result<()> {
        let depth = 200;
        let mut text = String::from("[a,");
        for i in 0..depth {
            text.push('(');
            text.push(char::from(b'b' + (i % 24) as u8));
            text.push_str(&"x".repeat(i / 24 + 1));
            text.push(',');
        }
        text.push('z');
        text.push_str(&")".repeat(depth));
        text.push(']');

        let layout = parse_with(&text, &grouped())?;
        assert_eq!(layout.dims().len(), depth + 2);
        assert_eq!(layout.summary(), &[2]);
        Ok(())
    }

    #[test]
    fn test_round_trip_through_display() -> Result<()> {
        for text in ["[band][row,column]", "[row,column,band]", "[a][b][c][d]"] {
            let layout = parse(text)?;
            assert_eq!(parse(&layout.to_string())?, layout);
        }
        let nested = parse_with("[a,(b,(c,d)),e][f]", &grouped())?;
        assert_eq!(parse_with(&nested.to_string(), &grouped())?, nested);
        Ok(())
    }

    #[test]
    fn test_malformed() {
        let cases = [
            "",
            "   ",
            "[]",
            "[band",
            "band]",
            "[band]row",
            "[row,,column]",
            "[row,]",
            "[row column]",
            "[band][band]",
            "[row,[column]]",
        ];
        for text in cases {
            assert!(
                matches!(parse(text), Err(LayoutError::MalformedLayout { .. })),
                "{text:?} should be malformed"
            );
        }

        for text in ["[(row,column]", "[row,column)]", "[(row)column]", "[row(column)]", "[()]"] {
            assert!(
                matches!(
                    parse_with(text, &grouped()),
                    Err(LayoutError::MalformedLayout { .. })
                ),
                "{text:?} should be malformed"
            );
        }
    }
}
