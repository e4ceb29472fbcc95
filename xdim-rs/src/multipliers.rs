use super::*;

/// Stride of every dimension within its top-level node.
pub type Multipliers = DimMap<usize>;

impl Layout {
    /// Computes the multiplier of every referenced dimension.
    ///
    /// Within a matrix the last part has multiplier 1 and each earlier part
    /// the product of the sizes after it, so the size of the first part is
    /// never needed. A vector node's dimension has multiplier 1.
    pub fn multipliers(&self, sizes: &Sizes) -> Result<Multipliers> {
        let mut multipliers = Multipliers::new();
        for node in self.nodes() {
            for (dim, multiplier) in terms(node, sizes)? {
                multipliers.insert(dim, multiplier);
            }
        }
        Ok(multipliers)
    }
}

/// `(dimension, multiplier)` pairs of one node in layout order. Nested
/// matrices fold row-major, so `(a,(b,c))` weighs like `(a,b,c)`.
pub(crate) fn terms<'a>(node: &'a Node, sizes: &Sizes) -> Result<Vec<(&'a str, usize)>> {
    let dims = node.dims();
    let mut terms = Vec::with_capacity(dims.len());
    let mut multiplier = 1usize;
    for (i, dim) in dims.iter().enumerate().rev() {
        terms.push((*dim, multiplier));
        if i > 0 {
            multiplier = multiplier.checked_mul(sizes.size(dim)?).ok_or_else(|| {
                LayoutError::ShapeMismatch(format!("stride of `{dim}` overflows"))
            })?;
        }
    }
    terms.reverse();
    Ok(terms)
}

/// Flat offset of `point` within one node.
pub(crate) fn node_offset(node: &Node, point: &Point, sizes: &Sizes) -> Result<usize> {
    terms(node, sizes)?
        .into_iter()
        .try_fold(0, |offset, (dim, multiplier)| {
            add_term(offset, point.coord(dim)?, multiplier)
        })
}

/// `offset + coord * multiplier`, failing instead of wrapping around.
pub(crate) fn add_term(offset: usize, coord: usize, multiplier: usize) -> Result<usize> {
    coord
        .checked_mul(multiplier)
        .and_then(|term| offset.checked_add(term))
        .ok_or_else(|| {
            LayoutError::ShapeMismatch(format!(
                "coordinate {coord} with multiplier {multiplier} overflows the storage offset"
            ))
        })
}
