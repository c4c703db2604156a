//! In-memory Brick building model backed by an oxigraph store.

use crate::graph::error::GraphError;
use log::{debug, info};
use oxigraph::io::RdfFormat;
use oxigraph::model::{NamedNode, Term};
use oxigraph::sparql::{QueryResults, QuerySolution};
use oxigraph::store::Store;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const BRICK_NAMESPACE: &str = "https://brickschema.org/schema/Brick#";
pub const DEFAULT_CONNSTRING_NAMESPACE: &str = "urn:dbc#";

const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";

/// Namespaces bound to the `brick:` and `dbc:` prefixes in every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    pub brick: String,
    /// Namespace of the `connstring` property on BACnet network nodes.
    pub connstring: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            brick: BRICK_NAMESPACE.to_string(),
            connstring: DEFAULT_CONNSTRING_NAMESPACE.to_string(),
        }
    }
}

/// A loaded building model, queried read-only with SPARQL.
#[derive(Clone)]
pub struct BuildingGraph {
    store: Store,
    namespaces: Namespaces,
}

impl BuildingGraph {
    /// Loads a serialized model from disk. The RDF format is picked from the file
    /// extension, falling back to Turtle.
    pub fn load(path: &Path, namespaces: Namespaces) -> Result<Self, GraphError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(RdfFormat::from_extension)
            .unwrap_or(RdfFormat::Turtle);

        let file = File::open(path).map_err(|e| GraphError::ModelOpen(path.to_path_buf(), e))?;
        let store = Store::new().map_err(GraphError::StoreCreation)?;
        store
            .load_from_reader(format, BufReader::new(file))
            .map_err(|e| GraphError::ModelParse(path.to_path_buf(), e))?;

        let graph = Self { store, namespaces };
        info!(
            "Loaded building model {} ({} triples)",
            path.display(),
            graph.len()
        );
        Ok(graph)
    }

    /// Builds a graph from Turtle text.
    pub fn from_turtle(data: &str, namespaces: Namespaces) -> Result<Self, GraphError> {
        let store = Store::new().map_err(GraphError::StoreCreation)?;
        store
            .load_from_reader(RdfFormat::Turtle, data.as_bytes())
            .map_err(GraphError::DataParse)?;
        Ok(Self { store, namespaces })
    }

    /// Number of triples in the model.
    pub fn len(&self) -> usize {
        self.store.len().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prefixes(&self) -> [(&str, &str); 5] {
        [
            ("rdf", RDF_NAMESPACE),
            ("rdfs", RDFS_NAMESPACE),
            ("owl", OWL_NAMESPACE),
            ("brick", &self.namespaces.brick),
            ("dbc", &self.namespaces.connstring),
        ]
    }

    /// Prefix declarations prepended to every query.
    pub(crate) fn prologue(&self) -> String {
        self.prefixes()
            .iter()
            .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>\n"))
            .collect()
    }

    /// Expands a prefixed name such as `brick:Boiler` over the query prefixes.
    /// Full IRIs and unknown prefixes are returned unchanged.
    pub fn expand(&self, name: &str) -> String {
        if let Some((prefix, local)) = name.split_once(':') {
            if let Some((_, namespace)) = self.prefixes().iter().find(|(p, _)| *p == prefix) {
                return format!("{namespace}{local}");
            }
        }
        name.to_string()
    }

    /// Runs a SELECT query (prologue included) and collects every solution.
    pub(crate) fn select(&self, body: &str) -> Result<Vec<QuerySolution>, GraphError> {
        let query = format!("{}{}", self.prologue(), body);
        debug!("Running SPARQL query:\n{}", query);

        match self.store.query(query.as_str())? {
            QueryResults::Solutions(solutions) => Ok(solutions.collect::<Result<Vec<_>, _>>()?),
            _ => Err(GraphError::UnexpectedResultKind),
        }
    }
}

/// Formats `iri` as a SPARQL IRI reference, rejecting anything that does not parse.
pub(crate) fn iri_ref(iri: &str) -> Result<String, GraphError> {
    NamedNode::new(iri)
        .map(|node| node.to_string())
        .map_err(|source| GraphError::InvalidIri {
            iri: iri.to_string(),
            source,
        })
}

pub(crate) fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

pub(crate) fn binding(solution: &QuerySolution, variable: &str) -> Result<String, GraphError> {
    optional_binding(solution, variable).ok_or_else(|| GraphError::MissingBinding(variable.into()))
}

pub(crate) fn optional_binding(solution: &QuerySolution, variable: &str) -> Option<String> {
    solution.get(variable).map(term_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const MINI_MODEL: &str = r#"
        @prefix brick: <https://brickschema.org/schema/Brick#> .
        @prefix bldg: <urn:bldg/> .

        bldg:BLR_A a brick:Boiler ;
            brick:feeds bldg:VAV_1 .
    "#;

    #[test]
    fn test_from_turtle_counts_triples() -> Result<(), GraphError> {
        let graph = BuildingGraph::from_turtle(MINI_MODEL, Namespaces::default())?;
        assert_eq!(graph.len(), 2);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = Builder::new().suffix(".ttl").tempfile()?;
        file.write_all(MINI_MODEL.as_bytes())?;
        file.flush()?;

        let graph = BuildingGraph::load(file.path(), Namespaces::default())?;
        assert!(!graph.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = BuildingGraph::load(Path::new("/nonexistent/model.ttl"), Namespaces::default());
        assert!(matches!(result, Err(GraphError::ModelOpen(_, _))));
    }

    #[test]
    fn test_iri_ref_rejects_garbage() {
        assert_eq!(iri_ref("urn:bldg/VAV_1").unwrap(), "<urn:bldg/VAV_1>");
        assert!(matches!(
            iri_ref("not an iri"),
            Err(GraphError::InvalidIri { .. })
        ));
    }

    #[test]
    fn test_expand_prefixed_names() -> Result<(), GraphError> {
        let graph = BuildingGraph::from_turtle(MINI_MODEL, Namespaces::default())?;
        assert_eq!(
            graph.expand("brick:Boiler"),
            "https://brickschema.org/schema/Brick#Boiler"
        );
        assert_eq!(graph.expand("dbc:connstring"), "urn:dbc#connstring");
        assert_eq!(graph.expand("urn:bldg/VAV_1"), "urn:bldg/VAV_1");
        assert_eq!(
            graph.expand("https://example.org/x#y"),
            "https://example.org/x#y"
        );
        Ok(())
    }

    #[test]
    fn test_select_binds_prefixes() -> Result<(), GraphError> {
        let graph = BuildingGraph::from_turtle(MINI_MODEL, Namespaces::default())?;
        let solutions = graph.select("SELECT ?b WHERE { ?b a brick:Boiler . }")?;
        assert_eq!(solutions.len(), 1);
        assert_eq!(binding(&solutions[0], "b")?, "urn:bldg/BLR_A");
        Ok(())
    }
}
