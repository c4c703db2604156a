use crate::archive::error::ArchiveError;
use crate::config::ConfigError;
use crate::graph::error::GraphError;
use crate::render::error::RenderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotWaterError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Output path exists but is not a directory: '{0}'")]
    OutputDirNotADirectory(PathBuf),
}
