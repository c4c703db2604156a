use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{charts} charts requested but at most {max} fit in one file")]
    TooManyCharts { charts: usize, max: usize },

    #[error("Failed to write output file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to build table for '{0}'")]
    Frame(PathBuf, #[source] PolarsError),

    #[error("Failed to write CSV file '{0}'")]
    Csv(PathBuf, #[source] PolarsError),
}
