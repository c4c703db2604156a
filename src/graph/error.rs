use oxigraph::model::IriParseError;
use oxigraph::sparql::EvaluationError;
use oxigraph::store::{LoaderError, StorageError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Failed to create in-memory graph store")]
    StoreCreation(#[source] StorageError),

    #[error("Failed to open building model '{0}'")]
    ModelOpen(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse building model '{0}'")]
    ModelParse(PathBuf, #[source] LoaderError),

    #[error("Failed to parse inline graph data")]
    DataParse(#[source] LoaderError),

    #[error("'{iri}' is not a valid IRI")]
    InvalidIri {
        iri: String,
        #[source]
        source: IriParseError,
    },

    #[error("SPARQL evaluation failed")]
    Evaluation(#[from] EvaluationError),

    #[error("Query returned a non-solution result (boolean or graph)")]
    UnexpectedResultKind,

    #[error("Query solution is missing binding for '?{0}'")]
    MissingBinding(String),

    #[error("Device instance '{value}' of point '{point}' is not numeric")]
    InvalidDeviceInstance { point: String, value: String },
}
