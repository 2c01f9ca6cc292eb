use crate::{
    error::{AppError, AppResult},
    models::CatalogItem,
    services::catalog::CatalogIndex,
};

/// Case-insensitive substring search over catalog titles, in row order
///
/// Backs the title picker of the presentation layer.
pub fn search_titles<'a>(
    catalog: &'a CatalogIndex,
    query: &str,
    limit: usize,
) -> AppResult<Vec<&'a CatalogItem>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    Ok(catalog
        .items()
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .take(limit)
        .collect())
}
