//! Library crate for xdim_rs
//!
//! Addresses values in nested multidimensional storage through a layout string such as
//! `[band][row,column]`. Every bracketed group is one storage level, outermost first; dimensions
//! grouped in one bracket share a level and are folded row-major into a single offset.
//!
//! ```
//! use xdim_rs::{parse, point, sizes, Storage};
//!
//! let layout = parse("[band][row,column]")?;
//! let data = Storage::table(vec![vec![0, 123, 123, 162], vec![213, 41, 62, 124], vec![84, 52, 124, 235]]);
//! let selection = layout.select(&data, &point! { band: 2, row: 1, column: 1 }, &sizes! { column: 2 })?;
//! assert_eq!(*selection.value, 235);
//! # Ok::<(), xdim_rs::LayoutError>(())
//! ```

mod cache;
mod clip;
mod dims;
mod error;
mod grammar;
mod iterator;
mod layout;
mod multipliers;
mod packed;
mod prepared;
mod rect;
mod select;
mod storage;
mod transform;

pub use crate::cache::LayoutCache;
pub use crate::clip::ClipValues;
pub use crate::dims::{DimMap, Point, Sizes};
pub use crate::error::LayoutError;
pub use crate::grammar::{Grouping, ParseOptions, parse, parse_with, validate, validate_with};
pub use crate::iterator::{PointSpace, Points, iter_points, iter_range};
pub use crate::layout::{Layout, Node};
pub use crate::multipliers::Multipliers;
pub use crate::packed::Packed;
pub use crate::prepared::{PreparedSelect, PreparedUpdate};
pub use crate::rect::{Rect, Span, validate_rect};
pub use crate::select::{Selection, SelectionMut};
pub use crate::storage::{ElementType, PreparedData, Storage, create_matrix};
pub use crate::transform::transform;

use crate::iterator::Odometer;
use crate::multipliers::{add_term, node_offset, terms};
use crate::packed::checked_product;
use crate::prepared::slot_lookup;
use crate::storage::{Cursor, build};

pub type Result<T> = std::result::Result<T, error::LayoutError>;
