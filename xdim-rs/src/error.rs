use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("the following invalid characters were used: {}", quoted(.0))]
    InvalidCharacter(Vec<char>),

    #[error("malformed layout `{layout}`: {reason}")]
    MalformedLayout { layout: String, reason: String },

    #[error("cannot calculate the location without knowing the size of the `{0}` dimension")]
    MissingSize(String),

    #[error("point has no coordinate for the `{0}` dimension")]
    MissingCoordinate(String),

    #[error("invalid hyper-rectangle for `{dim}` with start {start} and end {end}")]
    InvalidRect { dim: String, start: isize, end: isize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("index {index} out of bounds for storage level {level} of length {len}")]
    IndexOutOfBounds { level: usize, index: usize, len: usize },
}

impl LayoutError {
    pub(crate) fn malformed(layout: &str, reason: impl Into<String>) -> Self {
        LayoutError::MalformedLayout {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }
}

fn quoted(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
