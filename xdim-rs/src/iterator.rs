use super::*;
use std::ops::RangeInclusive;

/// Mixed-radix counter over inclusive ranges. The last axis turns fastest.
#[derive(Clone, Debug)]
pub(crate) struct Odometer {
    starts: Vec<usize>,
    ends: Vec<usize>,
    current: Vec<usize>,
    is_done: bool,
}

impl Odometer {
    pub(crate) fn new(ranges: &[RangeInclusive<usize>]) -> Self {
        let starts = ranges.iter().map(|range| *range.start()).collect::<Vec<_>>();
        Self {
            ends: ranges.iter().map(|range| *range.end()).collect(),
            current: starts.clone(),
            is_done: ranges.iter().any(|range| range.is_empty()),
            starts,
        }
    }

    /// Reading before the counter overflows, `None` after.
    pub(crate) fn current(&self) -> Option<&[usize]> {
        (!self.is_done).then_some(self.current.as_slice())
    }

    pub(crate) fn advance(&mut self) {
        if self.is_done {
            return;
        }
        if self.current.is_empty() {
            self.is_done = true;
            return;
        }

        let mut axis = self.current.len() - 1;
        loop {
            if self.current[axis] < self.ends[axis] {
                self.current[axis] += 1;
                break;
            }
            self.current[axis] = self.starts[axis];
            if axis == 0 {
                self.is_done = true;
                break;
            }
            axis -= 1;
        }
    }
}

/// Integers from `start` to `end`, both inclusive.
pub fn iter_range(start: usize, end: usize) -> RangeInclusive<usize> {
    start..=end
}

/// The coordinate space of a set of sizes, optionally restricted to a
/// rectangle and walked in a chosen dimension order.
#[derive(Clone, Debug)]
pub struct PointSpace<'a> {
    sizes: &'a Sizes,
    rect: Option<&'a Rect>,
    order: Option<Vec<String>>,
}

impl<'a> PointSpace<'a> {
    pub fn new(sizes: &'a Sizes) -> Self {
        Self {
            sizes,
            rect: None,
            order: None,
        }
    }

    /// Restricts every dimension named by `rect` to its span.
    pub fn with_rect(mut self, rect: &'a Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Sets the dimension order, slowest first. Only the listed dimensions
    /// are enumerated.
    pub fn with_order<S: AsRef<str>>(mut self, order: &[S]) -> Self {
        self.order = Some(order.iter().map(|dim| dim.as_ref().to_string()).collect());
        self
    }

    /// Dimensions in enumeration order, slowest first.
    ///
    /// Without an explicit order these are the sized dimensions plus any
    /// rect-only ones, sorted by ascending extent with ties broken by name.
    pub fn axes(&self) -> Vec<String> {
        if let Some(order) = &self.order {
            return order.clone();
        }

        let mut axes = self
            .sizes
            .iter()
            .map(|(dim, &size)| (dim.to_string(), size))
            .collect::<Vec<_>>();
        if let Some(rect) = self.rect {
            for (dim, span) in rect.iter() {
                if !self.sizes.contains(dim) {
                    axes.push((dim.to_string(), span.len()));
                }
            }
        }
        axes.sort_by(|(a, a_size), (b, b_size)| a_size.cmp(b_size).then_with(|| a.cmp(b)));
        axes.into_iter().map(|(dim, _)| dim).collect()
    }

    pub(crate) fn sizes(&self) -> &'a Sizes {
        self.sizes
    }

    /// Validated axes together with a counter over their ranges.
    pub(crate) fn odometer(&self) -> Result<(Vec<String>, Odometer)> {
        let empty = Rect::new();
        let rect = self.rect.unwrap_or(&empty);
        validate_rect(rect)?;

        let axes = self.axes();
        let ranges = axes
            .iter()
            .map(|dim| rect.range_of(dim, self.sizes))
            .collect::<Result<Vec<_>>>()?;
        Ok((axes, Odometer::new(&ranges)))
    }

    /// A fresh enumeration of every point in the space.
    pub fn iter(&self) -> Result<Points> {
        let (axes, odometer) = self.odometer()?;
        Ok(Points { axes, odometer })
    }
}

/// Lazily enumerated points, see [`PointSpace::iter`].
#[derive(Clone, Debug)]
pub struct Points {
    axes: Vec<String>,
    odometer: Odometer,
}

impl Points {
    /// Dimensions in enumeration order, slowest first.
    pub fn axes(&self) -> &[String] {
        &self.axes
    }
}

impl Iterator for Points {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        let point = self
            .axes
            .iter()
            .zip(self.odometer.current()?)
            .map(|(dim, &coord)| (dim.as_str(), coord))
            .collect();
        self.odometer.advance();
        Some(point)
    }
}

/// Every point of `sizes` in the default order.
pub fn iter_points(sizes: &Sizes) -> Result<Points> {
    PointSpace::new(sizes).iter()
}
