use super::*;

/// Offset arithmetic of one top-level node, specialised by arity.
///
/// Slots index the plan's axes; every pair is `(slot, multiplier)`.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Kernel {
    Axis(usize),
    Pair([(usize, usize); 2]),
    Triple([(usize, usize); 3]),
    Terms(Vec<(usize, usize)>),
}

impl Kernel {
    fn offset<F>(&self, coord: &F) -> Result<usize>
    where
        F: Fn(usize) -> Result<usize>,
    {
        match self {
            Kernel::Axis(slot) => coord(*slot),
            Kernel::Pair([(a, ma), (b, mb)]) => {
                add_term(add_term(0, coord(*a)?, *ma)?, coord(*b)?, *mb)
            }
            Kernel::Triple([(a, ma), (b, mb), (c, mc)]) => {
                let offset = add_term(add_term(0, coord(*a)?, *ma)?, coord(*b)?, *mb)?;
                add_term(offset, coord(*c)?, *mc)
            }
            Kernel::Terms(terms) => terms.iter().try_fold(0, |offset, &(slot, multiplier)| {
                add_term(offset, coord(slot)?, multiplier)
            }),
        }
    }
}

/// Multipliers of a layout resolved against fixed sizes, one kernel per
/// storage level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AccessPlan {
    axes: Vec<String>,
    kernels: Vec<Kernel>,
}

impl AccessPlan {
    pub(crate) fn new(layout: &Layout, sizes: &Sizes) -> Result<Self> {
        let mut axes = Vec::new();
        let mut kernels = Vec::with_capacity(layout.depth());
        for node in layout.nodes() {
            let mut slots = Vec::new();
            for (dim, multiplier) in terms(node, sizes)? {
                slots.push((axes.len(), multiplier));
                axes.push(dim.to_string());
            }
            kernels.push(match slots.as_slice() {
                [(slot, _)] => Kernel::Axis(*slot),
                [a, b] => Kernel::Pair([*a, *b]),
                [a, b, c] => Kernel::Triple([*a, *b, *c]),
                _ => Kernel::Terms(slots),
            });
        }

        log::trace!("prepared access plan for `{layout}` with summary {:?}", layout.summary());
        Ok(Self { axes, kernels })
    }

    /// Dimensions in layout order, the order positional coordinates use.
    pub(crate) fn axes(&self) -> &[String] {
        &self.axes
    }

    pub(crate) fn locate<'a, T>(
        &self,
        storage: &'a Storage<T>,
        coord: impl Fn(usize) -> Result<usize>,
    ) -> Result<(&'a [T], usize)> {
        storage.locate(self.kernels.len(), |level| self.kernels[level].offset(&coord))
    }

    pub(crate) fn locate_mut<'a, T>(
        &self,
        storage: &'a mut Storage<T>,
        coord: impl Fn(usize) -> Result<usize>,
    ) -> Result<(&'a mut [T], usize)> {
        storage.locate_mut(self.kernels.len(), |level| self.kernels[level].offset(&coord))
    }

    fn check_positional(&self, coords: &[usize]) -> Result<()> {
        if coords.len() != self.axes.len() {
            return Err(LayoutError::ShapeMismatch(format!(
                "expected {} coordinates ({}), got {}",
                self.axes.len(),
                self.axes.join(", "),
                coords.len()
            )));
        }
        Ok(())
    }
}

/// Point lookups bound to one storage, layout and set of sizes.
#[derive(Debug)]
pub struct PreparedSelect<'a, T> {
    storage: &'a Storage<T>,
    plan: AccessPlan,
}

impl<'a, T> PreparedSelect<'a, T> {
    /// Same result as [`Layout::select`] with the bound arguments.
    pub fn select(&self, point: &Point) -> Result<Selection<'a, T>> {
        let axes = self.plan.axes();
        self.select_with(|slot| point.coord(&axes[slot]))
    }

    /// Looks up a coordinate given positionally, one entry per
    /// [`axes`](Self::axes) element.
    pub fn select_at(&self, coords: &[usize]) -> Result<Selection<'a, T>> {
        self.plan.check_positional(coords)?;
        self.select_with(|slot| Ok(coords[slot]))
    }

    pub(crate) fn select_with(
        &self,
        coord: impl Fn(usize) -> Result<usize>,
    ) -> Result<Selection<'a, T>> {
        let (parent, index) = self.plan.locate(self.storage, coord)?;
        Ok(Selection {
            value: &parent[index],
            index,
            parent,
        })
    }

    pub fn axes(&self) -> &[String] {
        self.plan.axes()
    }
}

/// Point writes bound to one storage, layout and set of sizes.
#[derive(Debug)]
pub struct PreparedUpdate<'a, T> {
    storage: &'a mut Storage<T>,
    plan: AccessPlan,
}

impl<T> PreparedUpdate<'_, T> {
    /// Same effect as [`Layout::update`] with the bound arguments.
    pub fn update(&mut self, point: &Point, value: T) -> Result<()> {
        let axes = self.plan.axes();
        let (parent, index) = self
            .plan
            .locate_mut(self.storage, |slot| point.coord(&axes[slot]))?;
        parent[index] = value;
        Ok(())
    }

    pub fn update_at(&mut self, coords: &[usize], value: T) -> Result<()> {
        self.plan.check_positional(coords)?;
        self.update_with(|slot| Ok(coords[slot]), value)
    }

    pub(crate) fn update_with(
        &mut self,
        coord: impl Fn(usize) -> Result<usize>,
        value: T,
    ) -> Result<()> {
        let (parent, index) = self.plan.locate_mut(self.storage, coord)?;
        parent[index] = value;
        Ok(())
    }

    pub fn axes(&self) -> &[String] {
        self.plan.axes()
    }
}

/// Position in `axes` of every plan axis, for feeding positional readings
/// through a plan.
pub(crate) fn slot_lookup(plan_axes: &[String], axes: &[String]) -> Result<Vec<usize>> {
    plan_axes
        .iter()
        .map(|dim| {
            axes.iter()
                .position(|axis| axis == dim)
                .ok_or_else(|| LayoutError::MissingCoordinate(dim.clone()))
        })
        .collect()
}

impl Layout {
    /// Resolves multipliers once and binds them to `storage` for repeated
    /// lookups. Fails with [`LayoutError::MissingSize`] here rather than on
    /// first use.
    pub fn prepare_select<'a, T>(
        &self,
        storage: &'a Storage<T>,
        sizes: &Sizes,
    ) -> Result<PreparedSelect<'a, T>> {
        Ok(PreparedSelect {
            storage,
            plan: AccessPlan::new(self, sizes)?,
        })
    }

    pub fn prepare_update<'a, T>(
        &self,
        storage: &'a mut Storage<T>,
        sizes: &Sizes,
    ) -> Result<PreparedUpdate<'a, T>> {
        Ok(PreparedUpdate {
            storage,
            plan: AccessPlan::new(self, sizes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels_follow_arity() -> Result<()> {
        let sizes = sizes! { a: 2, b: 3, c: 4, d: 5 };
        let plan = AccessPlan::new(
            &parse("[a][b,c][e][f,g,h]")?,
            &sizes! { a: 2, b: 3, c: 4, e: 1, f: 6, g: 7, h: 5 },
        )?;
        assert_eq!(
            plan.kernels,
            vec![
                Kernel::Axis(0),
                Kernel::Pair([(1, 4), (2, 1)]),
                Kernel::Axis(3),
                Kernel::Triple([(4, 35), (5, 5), (6, 1)]),
            ]
        );

        let wide = AccessPlan::new(&parse("[a,b,c,d]")?, &sizes)?;
        assert_eq!(wide.kernels, vec![Kernel::Terms(vec![(0, 60), (1, 20), (2, 5), (3, 1)])]);
        assert_eq!(wide.axes(), &["a", "b", "c", "d"]);
        Ok(())
    }

    #[test]
    fn test_prepared_select_matches_select() -> Result<()> {
        let sizes = sizes! { band: 3, row: 2, column: 2 };
        for text in ["[band][row,column]", "[row,column,band]", "[band][row][column]", "[column][band,row]"] {
            let layout = parse(text)?;
            let PreparedData { mut data, .. } = layout.prepare_data(&sizes, 0)?;
            let mut value = 0;
            for band in 0..3 {
                for row in 0..2 {
                    for column in 0..2 {
                        let point = point! { band: band, row: row, column: column };
                        layout.update(&mut data, &point, &sizes, value)?;
                        value += 1;
                    }
                }
            }

            let prepared = layout.prepare_select(&data, &sizes)?;
            for band in 0..3 {
                for row in 0..2 {
                    for column in 0..2 {
                        let point = point! { band: band, row: row, column: column };
                        assert_eq!(prepared.select(&point)?, layout.select(&data, &point, &sizes)?);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_prepared_select_band_table() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        let data = Storage::table(vec![
            vec![0, 123, 123, 162],
            vec![213, 41, 62, 124],
            vec![84, 52, 124, 235],
        ]);
        let prepared = layout.prepare_select(&data, &sizes! { column: 2 })?;
        assert_eq!(prepared.axes(), &["band", "row", "column"]);
        assert_eq!(*prepared.select(&point! { band: 2, row: 1, column: 1 })?.value, 235);
        assert_eq!(*prepared.select_at(&[1, 0, 1])?.value, 41);
        assert!(matches!(
            prepared.select_at(&[1, 0]),
            Err(LayoutError::ShapeMismatch(_))
        ));
        Ok(())
    }

    #[test]
    fn test_prepare_fails_early_on_missing_size() -> Result<()> {
        let layout = parse("[band][row,column]")?;
        let data = Storage::table(vec![vec![0; 4]; 3]);
        assert_eq!(
            layout.prepare_select(&data, &sizes! { band: 3 }).map(|_| ()),
            Err(LayoutError::MissingSize("column".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_prepared_update() -> Result<()> {
        let layout = parse("[row,column,band]")?;
        let sizes = sizes! { band: 4, column: 2, row: 2 };
        let PreparedData { mut data, .. } = layout.prepare_data(&sizes, 0)?;

        let mut prepared = layout.prepare_update(&mut data, &sizes)?;
        prepared.update(&point! { band: 1, row: 1, column: 0 }, 12)?;
        prepared.update_at(&[0, 1, 3], 31)?;
        assert_eq!(
            prepared.update(&point! { band: 1, row: 1 }, 0),
            Err(LayoutError::MissingCoordinate("column".to_string()))
        );

        assert_eq!(*layout.select(&data, &point! { band: 1, row: 1, column: 0 }, &sizes)?.value, 12);
        assert_eq!(*layout.select(&data, &point! { band: 3, row: 0, column: 1 }, &sizes)?.value, 31);
        assert_eq!(data.values().sum::<i32>(), 43);
        Ok(())
    }
}
