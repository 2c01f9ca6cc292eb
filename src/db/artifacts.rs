use crate::{
    error::{AppError, AppResult},
    models::ExternalId,
    services::{catalog::CatalogIndex, similarity::SimilarityMatrix},
};
use serde::Deserialize;
use std::{io, path::Path};

const ID_COLUMN: &str = "movie_id";
const TITLE_COLUMN: &str = "title";

#[derive(Debug, Deserialize)]
struct CatalogRow {
    movie_id: u64,
    title: String,
}

/// Loads both precomputed artifacts and checks they are aligned
///
/// Any failure here is fatal: the service cannot answer requests without them.
pub fn load_artifacts(
    catalog_path: impl AsRef<Path>,
    similarity_path: impl AsRef<Path>,
) -> AppResult<(CatalogIndex, SimilarityMatrix)> {
    let catalog = load_catalog(catalog_path)?;
    let similarity = load_similarity(similarity_path)?;

    if similarity.size() != catalog.len() {
        return Err(AppError::Configuration(format!(
            "Similarity matrix size {} does not match catalog row count {}",
            similarity.size(),
            catalog.len()
        )));
    }

    tracing::info!(items = catalog.len(), "Loaded catalog and similarity artifacts");

    Ok((catalog, similarity))
}

pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<CatalogIndex> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path).map_err(|e| {
        AppError::Configuration(format!("Failed to open catalog {}: {}", path.display(), e))
    })?;
    read_catalog(reader)
}

/// Reads a catalog CSV. Requires `movie_id` and `title` headers; other columns are ignored.
pub fn read_catalog<R: io::Read>(mut reader: csv::Reader<R>) -> AppResult<CatalogIndex> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::Configuration(format!("Failed to read catalog header: {}", e)))?;

    for column in [ID_COLUMN, TITLE_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(AppError::Configuration(format!(
                "Catalog is missing required column '{}'",
                column
            )));
        }
    }

    let mut entries = Vec::new();
    for (line, record) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = record.map_err(|e| {
            AppError::Configuration(format!("Invalid catalog row {}: {}", line, e))
        })?;
        entries.push((ExternalId(row.movie_id), row.title));
    }

    CatalogIndex::new(entries)
}

pub fn load_similarity(path: impl AsRef<Path>) -> AppResult<SimilarityMatrix> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| {
            AppError::Configuration(format!(
                "Failed to open similarity matrix {}: {}",
                path.display(),
                e
            ))
        })?;
    read_similarity(reader)
}

/// Reads a header-less CSV of `N` rows by `N` scores
pub fn read_similarity<R: io::Read>(mut reader: csv::Reader<R>) -> AppResult<SimilarityMatrix> {
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::Configuration(format!("Invalid similarity row {}: {}", i, e))
        })?;
        let row = record
            .iter()
            .map(|field| field.trim().parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| {
                AppError::Configuration(format!("Invalid score in similarity row {}: {}", i, e))
            })?;
        rows.push(row);
    }

    SimilarityMatrix::from_rows(rows)
}

pub fn write_catalog<W: io::Write>(writer: W, catalog: &CatalogIndex) -> AppResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let to_config = |e: csv::Error| AppError::Configuration(format!("Failed to write catalog: {}", e));

    writer.write_record([ID_COLUMN, TITLE_COLUMN]).map_err(to_config)?;
    for item in catalog.items() {
        writer
            .write_record([item.external_id.to_string(), item.title.clone()])
            .map_err(to_config)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Configuration(format!("Failed to write catalog: {}", e)))
}

/// Writes scores with shortest round-trip formatting so a reload is lossless
pub fn write_similarity<W: io::Write>(writer: W, matrix: &SimilarityMatrix) -> AppResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for i in 0..matrix.size() {
        let row: Vec<String> = matrix.scores_for(i)?.map(|(_, s)| s.to_string()).collect();
        writer.write_record(&row).map_err(|e| {
            AppError::Configuration(format!("Failed to write similarity matrix: {}", e))
        })?;
    }
    writer.flush().map_err(|e| {
        AppError::Configuration(format!("Failed to write similarity matrix: {}", e))
    })
}
