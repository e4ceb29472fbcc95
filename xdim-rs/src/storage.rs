use super::*;
use serde::{Deserialize, Serialize};
use std::iter;

/// How one storage level is allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// A generic container holding one sub-storage per index.
    #[default]
    Container,
    /// A fixed-width contiguous buffer holding this level and every deeper
    /// one.
    Packed,
}

/// Nested in-memory structure addressed by a [`Layout`].
///
/// Depth equals the number of top-level layout nodes and the innermost level
/// holds the values. At the innermost level both element types are a single
/// [`Packed`] row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Storage<T> {
    Nested(Vec<Storage<T>>),
    Packed(Packed<T>),
}

/// Freshly allocated storage together with its shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedData<T> {
    pub data: Storage<T>,
    pub shape: Vec<usize>,
}

impl<T> Storage<T> {
    /// A single innermost row.
    pub fn leaf(values: Vec<T>) -> Self {
        Storage::Packed(Packed::row(values))
    }

    pub fn nested(children: Vec<Storage<T>>) -> Self {
        Storage::Nested(children)
    }

    /// Two levels: one row per entry.
    pub fn table(rows: Vec<Vec<T>>) -> Self {
        Storage::Nested(rows.into_iter().map(Storage::leaf).collect())
    }

    /// A contiguous buffer spanning `shape.len()` levels.
    pub fn packed(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Ok(Storage::Packed(Packed::new(data, shape)?))
    }

    /// Extent of the outermost level.
    pub fn len(&self) -> usize {
        match self {
            Storage::Nested(children) => children.len(),
            Storage::Packed(block) => block.shape()[0],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-level extents, following the first entry of every level.
    pub fn extents(&self) -> Vec<usize> {
        let mut extents = Vec::new();
        let mut current = self;
        loop {
            match current {
                Storage::Nested(children) => {
                    extents.push(children.len());
                    match children.first() {
                        Some(child) => current = child,
                        None => return extents,
                    }
                }
                Storage::Packed(block) => {
                    extents.extend_from_slice(block.shape());
                    return extents;
                }
            }
        }
    }

    /// All values, outermost level slowest.
    pub fn values(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            Storage::Nested(children) => Box::new(children.iter().flat_map(Storage::values)),
            Storage::Packed(block) => Box::new(block.data().iter()),
        }
    }

    /// Walks `depth` levels, asking `offset` for the index at each one, and
    /// returns the innermost row with the index inside it.
    pub(crate) fn locate<F>(&self, depth: usize, mut offset: F) -> Result<(&[T], usize)>
    where
        F: FnMut(usize) -> Result<usize>,
    {
        let last = depth.checked_sub(1).ok_or_else(|| {
            LayoutError::ShapeMismatch("layout has no levels".to_string())
        })?;
        let mut cursor = Cursor::new(self);
        for level in 0..last {
            cursor = cursor.child(level, offset(level)?)?;
        }
        let parent = cursor.row(last)?;
        let index = offset(last)?;
        if index >= parent.len() {
            return Err(LayoutError::IndexOutOfBounds {
                level: last,
                index,
                len: parent.len(),
            });
        }
        Ok((parent, index))
    }

    /// Mutable counterpart of [`Storage::locate`].
    pub(crate) fn locate_mut<F>(&mut self, depth: usize, mut offset: F) -> Result<(&mut [T], usize)>
    where
        F: FnMut(usize) -> Result<usize>,
    {
        let mut current = self;
        let mut level = 0;
        loop {
            match current {
                Storage::Nested(children) => {
                    if level + 1 >= depth {
                        return Err(nesting_mismatch(level, depth));
                    }
                    let index = offset(level)?;
                    let len = children.len();
                    current = children
                        .get_mut(index)
                        .ok_or(LayoutError::IndexOutOfBounds { level, index, len })?;
                    level += 1;
                }
                Storage::Packed(block) => return block.locate_mut(level, depth, offset),
            }
        }
    }
}

fn nesting_mismatch(level: usize, depth: usize) -> LayoutError {
    LayoutError::ShapeMismatch(format!(
        "storage level {level} holds containers but a layout of depth {depth} ends there"
    ))
}

/// Read-only position inside a storage, one level at a time.
#[derive(Debug)]
pub(crate) enum Cursor<'a, T> {
    Nested(&'a [Storage<T>]),
    Block {
        block: &'a Packed<T>,
        axis: usize,
        base: usize,
    },
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(storage: &'a Storage<T>) -> Self {
        match storage {
            Storage::Nested(children) => Cursor::Nested(children),
            Storage::Packed(block) => Cursor::Block {
                block,
                axis: 0,
                base: 0,
            },
        }
    }

    /// Descends into entry `index` of storage level `level`.
    pub(crate) fn child(self, level: usize, index: usize) -> Result<Cursor<'a, T>> {
        match self {
            Cursor::Nested(children) => children
                .get(index)
                .map(Cursor::new)
                .ok_or(LayoutError::IndexOutOfBounds {
                    level,
                    index,
                    len: children.len(),
                }),
            Cursor::Block { block, axis, base } => {
                if axis + 1 >= block.rank() {
                    return Err(LayoutError::ShapeMismatch(format!(
                        "storage level {level} holds values but the layout nests deeper"
                    )));
                }
                let len = block.shape()[axis];
                if index >= len {
                    return Err(LayoutError::IndexOutOfBounds { level, index, len });
                }
                Ok(Cursor::Block {
                    block,
                    axis: axis + 1,
                    base: base + index * block.strides()[axis],
                })
            }
        }
    }

    /// The innermost row this cursor points at.
    pub(crate) fn row(self, level: usize) -> Result<&'a [T]> {
        match self {
            Cursor::Nested(_) => Err(nesting_mismatch(level, level + 1)),
            Cursor::Block { block, axis, base } => {
                if axis + 1 != block.rank() {
                    return Err(LayoutError::ShapeMismatch(format!(
                        "storage level {level} is not innermost in packed storage of rank {}",
                        block.rank()
                    )));
                }
                let len = block.shape()[axis];
                Ok(&block.data()[base..base + len])
            }
        }
    }
}

impl Layout {
    /// Storage extent of every top-level node: a vector's size, or the
    /// product of all sizes grouped by a matrix.
    pub fn shape(&self, sizes: &Sizes) -> Result<Vec<usize>> {
        self.nodes()
            .iter()
            .map(|node| {
                let extents = node
                    .dims()
                    .into_iter()
                    .map(|dim| sizes.size(dim))
                    .collect::<Result<Vec<_>>>()?;
                checked_product(&extents)
            })
            .collect()
    }

    /// Allocates storage for `sizes`, every value set to `fill`.
    pub fn prepare_data<T: Clone>(&self, sizes: &Sizes, fill: T) -> Result<PreparedData<T>> {
        let shape = self.shape(sizes)?;
        let data = create_matrix(&shape, fill, None)?;
        log::debug!("allocated storage of shape {shape:?} for `{self}`");
        Ok(PreparedData { data, shape })
    }

    /// Allocates storage for `sizes`, choosing the buffer kind of every
    /// level from `element_types`.
    pub fn prepare_data_with<T: Clone>(
        &self,
        sizes: &Sizes,
        fill: T,
        element_types: &[ElementType],
    ) -> Result<PreparedData<T>> {
        let shape = self.shape(sizes)?;
        let data = create_matrix(&shape, fill, Some(element_types))?;
        log::debug!(
            "allocated storage of shape {shape:?} with {element_types:?} for `{self}`"
        );
        Ok(PreparedData { data, shape })
    }
}

/// Allocates storage of the given shape, every value set to `fill`.
///
/// `element_types`, when given, must have one entry per level.
pub fn create_matrix<T: Clone>(
    shape: &[usize],
    fill: T,
    element_types: Option<&[ElementType]>,
) -> Result<Storage<T>> {
    let default_types;
    let element_types = match element_types {
        Some(types) => types,
        None => {
            default_types = vec![ElementType::Container; shape.len()];
            &default_types
        }
    };
    build(shape, element_types, &mut iter::repeat(fill))
}

/// Builds storage of `shape`, consuming values in row-major order.
pub(crate) fn build<T, I>(
    shape: &[usize],
    element_types: &[ElementType],
    values: &mut I,
) -> Result<Storage<T>>
where
    I: Iterator<Item = T>,
{
    if shape.is_empty() {
        return Err(LayoutError::ShapeMismatch(
            "storage needs at least one level".to_string(),
        ));
    }
    if element_types.len() != shape.len() {
        return Err(LayoutError::ShapeMismatch(format!(
            "{} element types given for a shape of {} levels",
            element_types.len(),
            shape.len()
        )));
    }

    if shape.len() == 1 || element_types[0] == ElementType::Packed {
        if let Some(level) = element_types
            .iter()
            .position(|&kind| kind == ElementType::Container)
            .filter(|&level| level > 0)
        {
            return Err(LayoutError::ShapeMismatch(format!(
                "level {level} cannot be a container inside a packed level"
            )));
        }
        let size = checked_product(shape)?;
        let data = values.by_ref().take(size).collect::<Vec<_>>();
        if data.len() != size {
            return Err(LayoutError::ShapeMismatch(format!(
                "expected {size} values for shape {shape:?}, got {}",
                data.len()
            )));
        }
        return Storage::packed(data, shape);
    }

    let children = (0..shape[0])
        .map(|_| build(&shape[1..], &element_types[1..], values))
        .collect::<Result<Vec<_>>>()?;
    Ok(Storage::Nested(children))
}
