use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, ExternalId},
};
use std::collections::{HashMap, HashSet};

/// Immutable in-memory index of the catalog, keyed by row position
#[derive(Debug)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    /// Title to the first row carrying it
    rows_by_title: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Builds the index from `(external_id, title)` pairs in row order.
    ///
    /// Duplicate titles resolve to their first row. Duplicate external ids are
    /// kept; both are reported through logs.
    pub fn new(entries: Vec<(ExternalId, String)>) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::Configuration(
                "Catalog contains no items".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(entries.len());
        let mut rows_by_title = HashMap::with_capacity(entries.len());
        let mut seen_ids = HashSet::with_capacity(entries.len());
        let mut duplicate_titles = 0usize;
        let mut duplicate_ids = 0usize;

        for (row_index, (external_id, title)) in entries.into_iter().enumerate() {
            if rows_by_title.contains_key(&title) {
                duplicate_titles += 1;
            } else {
                rows_by_title.insert(title.clone(), row_index);
            }
            if !seen_ids.insert(external_id) {
                duplicate_ids += 1;
            }
            items.push(CatalogItem {
                row_index,
                external_id,
                title,
            });
        }

        if duplicate_titles > 0 {
            tracing::warn!(
                duplicates = duplicate_titles,
                "Catalog has duplicate titles; lookups resolve to the first row"
            );
        }
        if duplicate_ids > 0 {
            tracing::warn!(duplicates = duplicate_ids, "Catalog has duplicate external ids");
        }

        Ok(Self {
            items,
            rows_by_title,
        })
    }

    /// Resolves an exact title to its row
    pub fn lookup_row(&self, title: &str) -> AppResult<usize> {
        self.rows_by_title
            .get(title)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Title '{}' is not in the catalog", title)))
    }

    pub fn get(&self, row_index: usize) -> Option<&CatalogItem> {
        self.items.get(row_index)
    }

    pub fn external_id(&self, row_index: usize) -> Option<ExternalId> {
        self.items.get(row_index).map(|item| item.external_id)
    }

    /// All items in row order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
