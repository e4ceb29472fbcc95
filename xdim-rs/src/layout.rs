use super::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A node of a parsed layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// A single dimension occupying its own storage level.
    Vector { dim: String },
    /// Several co-located dimensions folded into one flat offset. The last
    /// part varies fastest.
    Matrix { parts: Vec<Node> },
}

impl Node {
    pub fn vector(dim: impl Into<String>) -> Self {
        Node::Vector { dim: dim.into() }
    }

    pub fn matrix(parts: Vec<Node>) -> Self {
        Node::Matrix { parts }
    }

    /// Number of dimensions this node groups at its own level: 1 for a
    /// vector, the part count for a matrix.
    pub fn arity(&self) -> usize {
        match self {
            Node::Vector { .. } => 1,
            Node::Matrix { parts } => parts.len(),
        }
    }

    /// Member dimensions in offset order, nested matrices flattened.
    pub fn dims(&self) -> Vec<&str> {
        let mut dims = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Vector { dim } => dims.push(dim.as_str()),
                Node::Matrix { parts } => stack.extend(parts.iter().rev()),
            }
        }
        dims
    }
}

/// Parsed description of how logical dimensions nest in storage.
///
/// The first node is the outermost storage level. Layouts are immutable once
/// built; use a [`LayoutCache`] to share them between calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    summary: Vec<usize>,
    dims: Vec<Node>,
}

impl Layout {
    pub(crate) fn new(dims: Vec<Node>) -> Self {
        let summary = dims.iter().map(Node::arity).collect();
        Self { summary, dims }
    }

    /// Top-level nodes, outermost first.
    pub fn nodes(&self) -> &[Node] {
        &self.dims
    }

    /// Arity of every top-level node.
    pub fn summary(&self) -> &[usize] {
        &self.summary
    }

    /// Number of storage levels.
    pub fn depth(&self) -> usize {
        self.dims.len()
    }

    /// Every referenced dimension, in layout order.
    pub fn dims(&self) -> Vec<&str> {
        self.dims.iter().flat_map(Node::dims).collect()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Vector { dim } => f.write_str(dim),
            Node::Matrix { parts } => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match part {
                        Node::Vector { .. } => write!(f, "{part}")?,
                        Node::Matrix { .. } => write!(f, "({part})")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.dims {
            write!(f, "[{node}]")?;
        }
        Ok(())
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_parts() -> Result<()> {
        let layout: Layout = "[band][row,column]".parse()?;
        assert_eq!(layout.summary(), &[1, 2]);
        assert_eq!(layout.depth(), 2);
        assert_eq!(layout.dims(), vec!["band", "row", "column"]);
        Ok(())
    }

    #[test]
    fn display_is_canonical() -> Result<()> {
        let layout: Layout = "[ band ][row, column]".parse()?;
        assert_eq!(layout.to_string(), "[band][row,column]");

        let nested = Layout::new(vec![Node::matrix(vec![
            Node::vector("band"),
            Node::matrix(vec![Node::vector("row"), Node::vector("column")]),
        ])]);
        assert_eq!(nested.to_string(), "[band,(row,column)]");
        assert_eq!(nested.summary(), &[2]);
        assert_eq!(nested.dims(), vec!["band", "row", "column"]);
        Ok(())
    }

    #[test]
    fn serializes_tagged_nodes() -> Result<()> {
        let layout: Layout = "[band][row,column]".parse()?;
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "summary": [1, 2],
                "dims": [
                    { "type": "Vector", "dim": "band" },
                    { "type": "Matrix", "parts": [
                        { "type": "Vector", "dim": "row" },
                        { "type": "Vector", "dim": "column" }
                    ]}
                ]
            })
        );
        assert_eq!(serde_json::from_value::<Layout>(json).unwrap(), layout);
        Ok(())
    }
}
