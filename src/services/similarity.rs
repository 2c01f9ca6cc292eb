use crate::error::{AppError, AppResult};

/// Immutable square matrix of pairwise similarity scores, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Builds a matrix from its rows. Every row must have one finite score per row.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(AppError::Configuration(format!(
                    "Similarity matrix is not square: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(AppError::Configuration(format!(
                    "Similarity matrix has a non-finite score at ({}, {})",
                    i, j
                )));
            }
            scores.extend(row);
        }

        Ok(Self { size, scores })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Scores of `row_index` against every row, in row order
    pub fn scores_for(
        &self,
        row_index: usize,
    ) -> AppResult<impl Iterator<Item = (usize, f32)> + '_> {
        let row = self.row(row_index)?;
        Ok(row.iter().copied().enumerate())
    }

    fn row(&self, row_index: usize) -> AppResult<&[f32]> {
        if row_index >= self.size {
            return Err(AppError::OutOfRange {
                row: row_index,
                size: self.size,
            });
        }
        let start = row_index * self.size;
        Ok(&self.scores[start..start + self.size])
    }
}
