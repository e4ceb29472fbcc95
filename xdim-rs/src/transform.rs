use super::*;

/// Re-projects every value of `storage`, laid out as `from`, into freshly
/// allocated storage laid out as `to`.
///
/// Every point of `sizes` is visited exactly once. Both layouts are resolved
/// against `sizes` up front, so a missing size fails before any copying.
pub fn transform<T: Clone + Default>(
    storage: &Storage<T>,
    from: &Layout,
    to: &Layout,
    sizes: &Sizes,
) -> Result<Storage<T>> {
    let PreparedData { mut data, shape } = to.prepare_data(sizes, T::default())?;
    let (axes, mut odometer) = PointSpace::new(sizes).odometer()?;

    let source = from.prepare_select(storage, sizes)?;
    let source_lookup = slot_lookup(source.axes(), &axes)?;
    let mut target = to.prepare_update(&mut data, sizes)?;
    let target_lookup = slot_lookup(target.axes(), &axes)?;

    let mut visited = 0usize;
    while let Some(reading) = odometer.current() {
        let value = source
            .select_with(|slot| Ok(reading[source_lookup[slot]]))?
            .value
            .clone();
        target.update_with(|slot| Ok(reading[target_lookup[slot]]), value)?;
        odometer.advance();
        visited += 1;
    }

    log::debug!("transformed {visited} values from `{from}` to `{to}` with shape {shape:?}");
    Ok(data)
}

impl Layout {
    /// Re-projects `storage` from this layout into `to`, see [`transform`].
    pub fn transform<T: Clone + Default>(
        &self,
        storage: &Storage<T>,
        to: &Layout,
        sizes: &Sizes,
    ) -> Result<Storage<T>> {
        transform(storage, self, to, sizes)
    }
}
