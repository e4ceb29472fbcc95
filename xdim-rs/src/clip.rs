use super::*;
use itertools::Itertools;

impl Layout {
    /// Extracts the values inside `rect` and reshapes them into fresh
    /// storage laid out like `self`, one level per top-level node with the
    /// clipped extents.
    ///
    /// Dimensions absent from `rect` keep their full declared extent.
    pub fn clip<T: Clone>(&self, storage: &Storage<T>, sizes: &Sizes, rect: &Rect) -> Result<Storage<T>> {
        let values = self.gather(storage, sizes, rect)?;

        let clipped = self
            .dims()
            .into_iter()
            .map(|dim| Ok((dim, rect.range_of(dim, sizes)?.count())))
            .collect::<Result<Sizes>>()?;
        let shape = self.shape(&clipped)?;
        let element_types = vec![ElementType::Container; shape.len()];

        log::debug!("clipped {} values of `{self}` into shape {shape:?}", values.len());
        build(&shape, &element_types, &mut values.into_iter().cloned())
    }

    /// Extracts the values inside `rect` as one flat sequence, in storage
    /// order.
    pub fn clip_flat<T: Clone>(&self, storage: &Storage<T>, sizes: &Sizes, rect: &Rect) -> Result<Vec<T>> {
        let values = self.gather(storage, sizes, rect)?;
        log::debug!("clipped {} values of `{self}`", values.len());
        Ok(values.into_iter().cloned().collect())
    }

    /// Lazily yields the values inside a point space in its enumeration
    /// order, the rect of `space` restricting the region.
    pub fn iter_clip<'a, T>(
        &self,
        storage: &'a Storage<T>,
        space: &PointSpace<'_>,
    ) -> Result<ClipValues<'a, T>> {
        let (axes, odometer) = space.odometer()?;
        let select = self.prepare_select(storage, space.sizes())?;
        let lookup = slot_lookup(select.axes(), &axes)?;
        Ok(ClipValues {
            select,
            odometer,
            lookup,
        })
    }

    // Walks the nodes with a working set of cursors, one per container
    // selected so far.
    fn gather<'a, T>(&self, storage: &'a Storage<T>, sizes: &Sizes, rect: &Rect) -> Result<Vec<&'a T>> {
        validate_rect(rect)?;

        let nodes = self.nodes();
        let last = self
            .depth()
            .checked_sub(1)
            .ok_or_else(|| LayoutError::ShapeMismatch("layout has no levels".to_string()))?;
        let mut cursors = vec![Cursor::new(storage)];
        for (level, node) in nodes[..last].iter().enumerate() {
            let offsets = clip_offsets(node, sizes, rect)?;
            cursors = cursors
                .into_iter()
                .flat_map(|cursor| offsets.iter().map(move |&offset| cursor.child(level, offset)))
                .collect::<Result<Vec<_>>>()?;
        }

        let offsets = clip_offsets(&nodes[last], sizes, rect)?;
        let mut values = Vec::with_capacity(cursors.len() * offsets.len());
        for cursor in cursors {
            let row = cursor.row(last)?;
            for &index in &offsets {
                let value = row.get(index).ok_or(LayoutError::IndexOutOfBounds {
                    level: last,
                    index,
                    len: row.len(),
                })?;
                values.push(value);
            }
        }
        Ok(values)
    }
}

/// Offsets within one node covered by `rect`, first part slowest.
fn clip_offsets(node: &Node, sizes: &Sizes, rect: &Rect) -> Result<Vec<usize>> {
    let terms = terms(node, sizes)?;
    let ranges = terms
        .iter()
        .map(|(dim, _)| rect.range_of(dim, sizes))
        .collect::<Result<Vec<_>>>()?;

    ranges
        .into_iter()
        .multi_cartesian_product()
        .map(|coords| {
            coords
                .iter()
                .zip(&terms)
                .try_fold(0, |offset, (&coord, &(_, multiplier))| {
                    add_term(offset, coord, multiplier)
                })
        })
        .collect()
}

/// Values of a clipped region, see [`Layout::iter_clip`].
#[derive(Debug)]
pub struct ClipValues<'a, T> {
    select: PreparedSelect<'a, T>,
    odometer: Odometer,
    // position in the odometer reading of every layout dimension
    lookup: Vec<usize>,
}

impl<'a, T> Iterator for ClipValues<'a, T> {
    type Item = Result<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        let reading = self.odometer.current()?;
        let lookup = &self.lookup;
        let value = self
            .select
            .select_with(|slot| Ok(reading[lookup[slot]]))
            .map(|selection| selection.value);
        self.odometer.advance();
        Some(value)
    }
}
