//! Faceting: splitting a plot into a grid of panels on categorical
//! variables.

use crate::data::Dataset;
use crate::error::PlotError;

/// Axis sharing policy across facet panels. Affects scale training only,
/// never the number of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetPolicy {
    #[default]
    Fixed,
    FreeX,
    FreeY,
    Free,
}

impl FacetPolicy {
    pub fn parse(name: &str) -> Option<FacetPolicy> {
        match name {
            "fixed" => Some(FacetPolicy::Fixed),
            "free_x" => Some(FacetPolicy::FreeX),
            "free_y" => Some(FacetPolicy::FreeY),
            "free" => Some(FacetPolicy::Free),
            _ => None,
        }
    }
}

/// Grid faceting on a row variable, a column variable, or both.
///
/// N distinct row values and M distinct column values produce exactly
/// N x M panels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetSpec {
    pub rows: Option<String>,
    pub cols: Option<String>,
    pub policy: FacetPolicy,
}

impl FacetSpec {
    #[must_use]
    pub fn grid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rows(mut self, variable: impl Into<String>) -> Self {
        self.rows = Some(variable.into());
        self
    }

    #[must_use]
    pub fn cols(mut self, variable: impl Into<String>) -> Self {
        self.cols = Some(variable.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: FacetPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One cell of the facet grid.
#[derive(Debug, Clone)]
pub struct FacetCell {
    pub row: usize,
    pub col: usize,
    pub title: String,
    pub row_value: Option<String>,
    pub col_value: Option<String>,
}

/// Grid dimensions plus the cells in row-major order.
#[derive(Debug, Clone)]
pub struct FacetGrid {
    pub nrow: usize,
    pub ncol: usize,
    pub cells: Vec<FacetCell>,
}

/// Compute the facet grid for a dataset. Without a facet spec the grid
/// is a single untitled cell.
pub fn facet_grid(data: &Dataset, facet: Option<&FacetSpec>) -> Result<FacetGrid, PlotError> {
    let Some(facet) = facet else {
        return Ok(FacetGrid {
            nrow: 1,
            ncol: 1,
            cells: vec![FacetCell {
                row: 0,
                col: 0,
                title: String::new(),
                row_value: None,
                col_value: None,
            }],
        });
    };

    let row_values = facet_values(data, facet.rows.as_deref())?;
    let col_values = facet_values(data, facet.cols.as_deref())?;

    let mut cells = Vec::with_capacity(row_values.len() * col_values.len());
    for (r, row_value) in row_values.iter().enumerate() {
        for (c, col_value) in col_values.iter().enumerate() {
            let mut parts = Vec::new();
            if let (Some(var), Some(value)) = (&facet.rows, row_value) {
                parts.push(format!("{} = {}", var, value));
            }
            if let (Some(var), Some(value)) = (&facet.cols, col_value) {
                parts.push(format!("{} = {}", var, value));
            }
            cells.push(FacetCell {
                row: r,
                col: c,
                title: parts.join(", "),
                row_value: row_value.clone(),
                col_value: col_value.clone(),
            });
        }
    }

    Ok(FacetGrid {
        nrow: row_values.len(),
        ncol: col_values.len(),
        cells,
    })
}

/// Distinct values of a facet variable; a missing spec axis collapses to
/// a single unconstrained slot.
fn facet_values(data: &Dataset, variable: Option<&str>) -> Result<Vec<Option<String>>, PlotError> {
    match variable {
        None => Ok(vec![None]),
        Some(var) => {
            let values = data.distinct(var).ok_or_else(|| {
                PlotError::Data(format!("facet variable `{}` is not a column of the dataset", var))
            })?;
            Ok(values.into_iter().map(Some).collect())
        }
    }
}

/// The subset of a dataset belonging to one facet cell.
///
/// A layer-specific dataset missing a facet variable is replicated into
/// every cell along that axis rather than dropped.
pub fn cell_data(data: &Dataset, cell: &FacetCell, facet: &FacetSpec) -> Dataset {
    let row_idx = facet.rows.as_deref().and_then(|v| data.column_index(v));
    let col_idx = facet.cols.as_deref().and_then(|v| data.column_index(v));

    data.filter(|row| {
        let row_ok = match (row_idx, &cell.row_value) {
            (Some(idx), Some(value)) => &row[idx] == value,
            _ => true,
        };
        let col_ok = match (col_idx, &cell.col_value) {
            (Some(idx), Some(value)) => &row[idx] == value,
            _ => true,
        };
        row_ok && col_ok
    })
}
