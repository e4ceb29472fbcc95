use super::*;

/// A fixed-width contiguous buffer covering one or more storage levels.
///
/// Elements are stored row-major: the last level varies fastest and has
/// stride 1, so every innermost container is a contiguous sub-slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packed<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> Packed<T> {
    /// Wraps `data` as a buffer of the given per-level extents.
    pub fn new(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        if shape.is_empty() {
            return Err(LayoutError::ShapeMismatch(
                "packed storage needs at least one level".to_string(),
            ));
        }
        let size = checked_product(shape)?;
        if size != data.len() {
            return Err(LayoutError::ShapeMismatch(format!(
                "cannot pack {} values into shape {shape:?} of size {size}",
                data.len()
            )));
        }

        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// A single level holding `data`.
    pub(crate) fn row(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            data,
            shape: vec![len],
            strides: vec![1],
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of storage levels covered.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    // Linear position of a multi-level index
    fn get_index(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.shape.len() {
            return Err(LayoutError::ShapeMismatch(format!(
                "index rank mismatch: {} != {}",
                indices.len(),
                self.shape.len()
            )));
        }

        let mut linear_index = 0;
        for (level, &index) in indices.iter().enumerate() {
            if index >= self.shape[level] {
                return Err(LayoutError::IndexOutOfBounds {
                    level,
                    index,
                    len: self.shape[level],
                });
            }
            linear_index += index * self.strides[level];
        }
        Ok(linear_index)
    }

    /// Element at a multi-level index.
    pub fn get(&self, indices: &[usize]) -> Result<&T> {
        let linear_index = self.get_index(indices)?;
        Ok(&self.data[linear_index])
    }

    /// Walks the remaining layout levels starting at storage level `level`,
    /// returning the innermost row and the index within it.
    pub(crate) fn locate_mut<F>(
        &mut self,
        level: usize,
        depth: usize,
        mut offset: F,
    ) -> Result<(&mut [T], usize)>
    where
        F: FnMut(usize) -> Result<usize>,
    {
        let rank = self.rank();
        if level + rank != depth {
            return Err(LayoutError::ShapeMismatch(format!(
                "packed storage of rank {rank} at level {level} does not fit a layout of depth {depth}"
            )));
        }

        let mut base = 0;
        for axis in 0..rank - 1 {
            let index = offset(level + axis)?;
            if index >= self.shape[axis] {
                return Err(LayoutError::IndexOutOfBounds {
                    level: level + axis,
                    index,
                    len: self.shape[axis],
                });
            }
            base += index * self.strides[axis];
        }

        let len = self.shape[rank - 1];
        let index = offset(depth - 1)?;
        if index >= len {
            return Err(LayoutError::IndexOutOfBounds {
                level: depth - 1,
                index,
                len,
            });
        }
        Ok((&mut self.data[base..base + len], index))
    }
}

/// Row-major strides of a shape.
pub(crate) fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

pub(crate) fn checked_product(shape: &[usize]) -> Result<usize> {
    shape.iter().try_fold(1usize, |size, &extent| {
        size.checked_mul(extent).ok_or_else(|| {
            LayoutError::ShapeMismatch(format!("shape {shape:?} overflows"))
        })
    })
}
