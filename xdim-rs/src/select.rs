use super::*;
use std::mem;

/// Result of a point lookup.
#[derive(Debug, PartialEq)]
pub struct Selection<'a, T> {
    pub value: &'a T,
    /// Offset of the value inside `parent`.
    pub index: usize,
    /// Innermost container holding the value.
    pub parent: &'a [T],
}

/// Mutable result of a point lookup, for in-place updates without walking
/// the storage again.
#[derive(Debug)]
pub struct SelectionMut<'a, T> {
    pub index: usize,
    pub parent: &'a mut [T],
}

impl<T> SelectionMut<'_, T> {
    pub fn value(&self) -> &T {
        &self.parent[self.index]
    }

    /// Stores `value`, returning the previous one.
    pub fn set(&mut self, value: T) -> T {
        mem::replace(&mut self.parent[self.index], value)
    }
}

impl Layout {
    /// Looks up the value at `point`.
    ///
    /// `sizes` must hold every matrix dimension except the first part of
    /// each matrix.
    pub fn select<'a, T>(
        &self,
        storage: &'a Storage<T>,
        point: &Point,
        sizes: &Sizes,
    ) -> Result<Selection<'a, T>> {
        let nodes = self.nodes();
        let (parent, index) = storage.locate(nodes.len(), |level| {
            node_offset(&nodes[level], point, sizes)
        })?;
        Ok(Selection {
            value: &parent[index],
            index,
            parent,
        })
    }

    pub fn select_mut<'a, T>(
        &self,
        storage: &'a mut Storage<T>,
        point: &Point,
        sizes: &Sizes,
    ) -> Result<SelectionMut<'a, T>> {
        let nodes = self.nodes();
        let (parent, index) = storage.locate_mut(nodes.len(), |level| {
            node_offset(&nodes[level], point, sizes)
        })?;
        Ok(SelectionMut { index, parent })
    }

    /// Stores `value` at `point`.
    pub fn update<T>(
        &self,
        storage: &mut Storage<T>,
        point: &Point,
        sizes: &Sizes,
        value: T,
    ) -> Result<()> {
        self.select_mut(storage, point, sizes)?.set(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba() -> Storage<i32> {
        // 2x2 image, one band after another
        Storage::leaf((0..16).collect())
    }

    #[test]
    fn test_select_band_major_flat() -> Result<()> {
        let layout = parse("[band,row,column]")?;
        let data = rgba();
        let selection = layout.select(
            &data,
            &point! { band: 2, row: 1, column: 0 },
            &sizes! { column: 2, row: 2 },
        )?;
        assert_eq!(*selection.value, 10);
        assert_eq!(selection.index, 10);
        assert_eq!(selection.parent.len(), 16);
        Ok(())
    }

    #[test]
    fn test_select_image_data() -> Result<()> {
        let layout = parse("[row,column,band]")?;
        let data = Storage::leaf(vec![0, 10, 20, 30, 1, 11, 21, 31, 2, 12, 22, 32, 3, 13, 23, 33]);
        let selection = layout.select(
            &data,
            &point! { band: 1, row: 1, column: 0 },
            &sizes! { band: 4, column: 2 },
        )?;
        assert_eq!(*selection.value, 12);
        Ok(())
    }

    #[test]
    fn test_select_band_table() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        let data = Storage::table(vec![
            vec![0, 123, 123, 162],
            vec![213, 41, 62, 124],
            vec![84, 52, 124, 235],
        ]);
        let selection = layout.select(
            &data,
            &point! { band: 2, row: 1, column: 1 },
            &sizes! { column: 2 },
        )?;
        assert_eq!(*selection.value, 235);
        assert_eq!(selection.index, 3);
        assert_eq!(selection.parent, &[84, 52, 124, 235]);
        Ok(())
    }

    #[test]
    fn test_select_cube_needs_no_sizes() -> Result<()> {
        let layout = parse("[band][row][column]")?;
        let data = Storage::nested(vec![
            Storage::table(vec![vec![0, 123], vec![123, 162]]),
            Storage::table(vec![vec![213, 41], vec![62, 124]]),
            Storage::table(vec![vec![84, 52], vec![124, 235]]),
        ]);
        let selection = layout.select(&data, &point! { band: 2, row: 1, column: 1 }, &sizes! {})?;
        assert_eq!(*selection.value, 235);
        Ok(())
    }

    #[test]
    fn test_select_packed_storage() -> Result<()> {
        let layout = parse("[band][row][column]")?;
        let data = Storage::packed((0..12).collect(), &[3, 2, 2])?;
        let selection = layout.select(&data, &point! { band: 2, row: 1, column: 0 }, &sizes! {})?;
        assert_eq!(*selection.value, 10);
        assert_eq!(selection.parent, &[10, 11]);
        Ok(())
    }

    #[test]
    fn test_select_errors() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        let data = Storage::table(vec![vec![0, 1, 2, 3]]);

        assert_eq!(
            layout.select(&data, &point! { band: 0, row: 1, column: 1 }, &sizes! {}),
            Err(LayoutError::MissingSize("column".to_string()))
        );
        assert_eq!(
            layout.select(&data, &point! { band: 0, row: 1 }, &sizes! { column: 2 }),
            Err(LayoutError::MissingCoordinate("column".to_string()))
        );
        assert_eq!(
            layout.select(&data, &point! { band: 1, row: 0, column: 0 }, &sizes! { column: 2 }),
            Err(LayoutError::IndexOutOfBounds {
                level: 0,
                index: 1,
                len: 1
            })
        );
        assert_eq!(
            layout.select(&data, &point! { band: 0, row: 2, column: 0 }, &sizes! { column: 2 }),
            Err(LayoutError::IndexOutOfBounds {
                level: 1,
                index: 4,
                len: 4
            })
        );
        Ok(())
    }

    #[test]
    fn test_huge_coordinates_do_not_wrap() -> Result<()> {
        let layout = parse("[row,column]")?;
        let sizes = sizes! { column: 2 };
        let mut data = Storage::leaf(vec![10, 11, 12, 13]);
        let row = usize::MAX / 2 + 1;
        let point = point! { row: row, column: 1 };

        assert!(matches!(
            layout.select(&data, &point, &sizes),
            Err(LayoutError::ShapeMismatch(_))
        ));
        assert!(matches!(
            layout.prepare_select(&data, &sizes)?.select_at(&[row, 1]),
            Err(LayoutError::ShapeMismatch(_))
        ));
        assert!(matches!(
            layout.clip_flat(&data, &sizes, &rect! { row: [row, row] }),
            Err(LayoutError::ShapeMismatch(_))
        ));
        assert!(matches!(
            layout.update(&mut data, &point, &sizes, 0),
            Err(LayoutError::ShapeMismatch(_))
        ));
        assert_eq!(data, Storage::leaf(vec![10, 11, 12, 13]));
        Ok(())
    }

    #[test]
    fn test_update() -> Result<()> {
        let layout = parse("[row,column,band]")?;
        let mut data = Storage::leaf(vec![0; 60]);
        let sizes = sizes! { band: 4, column: 5 };
        layout.update(&mut data, &point! { band: 3, row: 2, column: 1 }, &sizes, 1)?;

        let values = data.values().copied().collect::<Vec<_>>();
        assert_eq!(values.iter().sum::<i32>(), 1);
        assert_eq!(values[2 * 5 * 4 + 4 + 3], 1);
        Ok(())
    }

    #[test]
    fn test_select_mut() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        let sizes = sizes! { column: 2 };
        let mut data = Storage::table(vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);

        let mut selection = layout.select_mut(&mut data, &point! { band: 1, row: 1, column: 0 }, &sizes)?;
        assert_eq!(*selection.value(), 6);
        assert_eq!(selection.set(60), 6);
        selection.parent[selection.index + 1] = 70;

        assert_eq!(data, Storage::table(vec![vec![0, 1, 2, 3], vec![4, 5, 60, 70]]));
        Ok(())
    }
}
