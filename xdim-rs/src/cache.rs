use super::*;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Parsed layouts keyed by their source string.
///
/// Safe to share between threads. Entries are never evicted; a layout
/// parsed twice by racing callers is stored once and both get equal values.
#[derive(Debug, Default)]
pub struct LayoutCache {
    options: ParseOptions,
    layouts: RwLock<HashMap<String, Arc<Layout>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache parsing every layout with `options`.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            layouts: RwLock::default(),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Returns the cached layout for `layout`, parsing it on first use.
    /// Parse failures are not cached.
    pub fn parse(&self, layout: &str) -> Result<Arc<Layout>> {
        if let Some(cached) = self
            .layouts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(layout)
        {
            log::trace!("layout cache hit for `{layout}`");
            return Ok(Arc::clone(cached));
        }

        log::trace!("layout cache miss for `{layout}`");
        let parsed = Arc::new(parse_with(layout, &self.options)?);
        let mut layouts = self.layouts.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            layouts.entry(layout.to_string()).or_insert(parsed),
        ))
    }

    pub fn len(&self) -> usize {
        self.layouts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.layouts.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
