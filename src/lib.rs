mod archive;
mod config;
mod error;
mod graph;
mod metadata;
mod pipeline;
mod render;
mod report;
mod types;
mod utils;

pub use error::HotWaterError;
pub use pipeline::*;

pub use config::*;
pub use report::*;

pub use archive::client::*;
pub use archive::download::*;
pub use archive::paths::*;
pub use archive::error::ArchiveError;

pub use graph::building_graph::*;
pub use graph::points::*;
pub use graph::topology::*;
pub use graph::error::GraphError;

pub use metadata::*;

pub use render::chart::*;
pub use render::export::*;
pub use render::palette::*;
pub use render::error::RenderError;

pub use types::consumer::*;
pub use types::path_entry::*;
pub use types::point::*;
pub use types::time_series::*;

pub use utils::ensure_output_dir;
