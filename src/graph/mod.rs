pub mod building_graph;
pub mod error;
pub mod points;
pub mod topology;

#[cfg(test)]
pub(crate) mod test_models;
