use super::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A mapping from dimension name to a per-dimension value.
///
/// Used for declared extents ([`Sizes`]), coordinates ([`Point`]) and
/// inclusive ranges ([`Rect`]). Dimensions are kept sorted by name so that
/// iteration is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimMap<V>(BTreeMap<String, V>);

/// Declared extent per dimension.
pub type Sizes = DimMap<usize>;

/// A coordinate: one index per dimension.
pub type Point = DimMap<usize>;

impl<V> DimMap<V> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the value of `dim`, returning the previous one.
    pub fn insert(&mut self, dim: impl Into<String>, value: V) -> Option<V> {
        self.0.insert(dim.into(), value)
    }

    pub fn with(mut self, dim: impl Into<String>, value: V) -> Self {
        self.insert(dim, value);
        self
    }

    pub fn get(&self, dim: &str) -> Option<&V> {
        self.0.get(dim)
    }

    pub fn contains(&self, dim: &str) -> bool {
        self.0.contains_key(dim)
    }

    pub fn dims(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(dim, value)| (dim.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DimMap<usize> {
    /// Declared size of `dim`, failing with [`LayoutError::MissingSize`].
    pub fn size(&self, dim: &str) -> Result<usize> {
        self.get(dim)
            .copied()
            .ok_or_else(|| LayoutError::MissingSize(dim.to_string()))
    }

    /// Coordinate along `dim`, failing with [`LayoutError::MissingCoordinate`].
    pub fn coord(&self, dim: &str) -> Result<usize> {
        self.get(dim)
            .copied()
            .ok_or_else(|| LayoutError::MissingCoordinate(dim.to_string()))
    }
}

impl<V> Default for DimMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for DimMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(dim, value)| (dim.into(), value)).collect())
    }
}

impl<V> IntoIterator for DimMap<V> {
    type Item = (String, V);
    type IntoIter = btree_map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds [`Sizes`] from `dim: size` pairs.
#[macro_export]
macro_rules! sizes {
    () => {
        $crate::Sizes::new()
    };
    ($($dim:ident : $size:expr),+ $(,)?) => {
        <$crate::Sizes as ::core::iter::FromIterator<(&str, usize)>>::from_iter(
            [$((stringify!($dim), $size)),+]
        )
    };
}

/// Builds a [`Point`] from `dim: coordinate` pairs.
#[macro_export]
macro_rules! point {
    () => {
        $crate::Point::new()
    };
    ($($dim:ident : $coord:expr),+ $(,)?) => {
        <$crate::Point as ::core::iter::FromIterator<(&str, usize)>>::from_iter(
            [$((stringify!($dim), $coord)),+]
        )
    };
}
