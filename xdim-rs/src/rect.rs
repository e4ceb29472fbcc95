use super::*;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// An inclusive `[start, end]` range along one dimension.
///
/// Bounds are signed so that an invalid range can be represented and
/// reported by [`validate_rect`] instead of being rejected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: isize,
    pub end: isize,
}

/// An axis-aligned hyper-rectangle: one inclusive [`Span`] per dimension.
pub type Rect = DimMap<Span>;

impl Span {
    pub fn new(start: isize, end: isize) -> Self {
        Self { start, end }
    }

    /// Number of indices covered, zero for an invalid span. Saturates at
    /// `usize::MAX`.
    pub fn len(&self) -> usize {
        if self.start <= self.end {
            self.end.abs_diff(self.start).saturating_add(1)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks `0 <= start <= end` and resolves the span to indices.
    pub fn resolve(&self, dim: &str) -> Result<RangeInclusive<usize>> {
        if self.start < 0 || self.start > self.end {
            return Err(LayoutError::InvalidRect {
                dim: dim.to_string(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(self.start as usize..=self.end as usize)
    }
}

// Bounds beyond `isize::MAX` saturate instead of wrapping negative.
fn saturate<T: TryInto<isize>>(bound: T) -> isize {
    bound.try_into().unwrap_or(isize::MAX)
}

macro_rules! impl_span_from {
    ($($numeric_type:ty),+) => {
        $(
            // Single index
            impl From<$numeric_type> for Span {
                fn from(idx: $numeric_type) -> Self {
                    Span::new(saturate(idx), saturate(idx))
                }
            }

            // Exclusive end
            impl From<Range<$numeric_type>> for Span {
                fn from(range: Range<$numeric_type>) -> Self {
                    Span::new(saturate(range.start), saturate(range.end).saturating_sub(1))
                }
            }

            impl From<RangeInclusive<$numeric_type>> for Span {
                fn from(range: RangeInclusive<$numeric_type>) -> Self {
                    Span::new(saturate(*range.start()), saturate(*range.end()))
                }
            }

            impl From<[$numeric_type; 2]> for Span {
                fn from([start, end]: [$numeric_type; 2]) -> Self {
                    Span::new(saturate(start), saturate(end))
                }
            }

            impl From<($numeric_type, $numeric_type)> for Span {
                fn from((start, end): ($numeric_type, $numeric_type)) -> Self {
                    Span::new(saturate(start), saturate(end))
                }
            }
        )+
    };
}

impl_span_from!(usize, isize, i32, i64, u32, u64);

/// Builds a [`Rect`] from `dim: span` pairs, where a span is anything
/// convertible into [`Span`] (`0..=3`, `[2, 2]`, `(1, 5)`, `4`).
#[macro_export]
macro_rules! rect {
    () => {
        $crate::Rect::new()
    };
    ($($dim:ident : $span:expr),+ $(,)?) => {
        <$crate::Rect as ::core::iter::FromIterator<(&str, $crate::Span)>>::from_iter(
            [$((stringify!($dim), $crate::Span::from($span))),+]
        )
    };
}

/// Fails with [`LayoutError::InvalidRect`] on the first span with a negative
/// start or with `start > end`.
pub fn validate_rect(rect: &Rect) -> Result<()> {
    for (dim, span) in rect.iter() {
        span.resolve(dim)?;
    }
    Ok(())
}

impl Rect {
    /// Range covered along `dim`: the rect's own span when present, the full
    /// declared extent otherwise. A span reaching past a declared extent is
    /// [`LayoutError::InvalidRect`].
    pub(crate) fn range_of(&self, dim: &str, sizes: &Sizes) -> Result<RangeInclusive<usize>> {
        let Some(span) = self.get(dim) else {
            return full_range(dim, sizes);
        };
        let range = span.resolve(dim)?;
        match sizes.get(dim) {
            Some(&size) if *range.end() >= size => Err(LayoutError::InvalidRect {
                dim: dim.to_string(),
                start: span.start,
                end: span.end,
            }),
            _ => Ok(range),
        }
    }
}

/// Full `[0, size - 1]` range of a dimension. An empty dimension yields an
/// empty range.
pub(crate) fn full_range(dim: &str, sizes: &Sizes) -> Result<RangeInclusive<usize>> {
    let size = sizes.size(dim)?;
    Ok(match size.checked_sub(1) {
        Some(last) => 0..=last,
        None => 1..=0,
    })
}
