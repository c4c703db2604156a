use crate::graph::building_graph::{binding, optional_binding, BuildingGraph};
use crate::graph::error::GraphError;
use crate::types::consumer::TopologyRow;
use log::{info, warn};

/// Boilers, everything they feed down to terminal units, the equipment right
/// upstream of each unit, and the HVAC zones those units serve. Type bindings
/// that have a more specific matching subclass are filtered out.
const HOT_WATER_CONSUMERS_QUERY: &str = r#"SELECT DISTINCT * WHERE {
    ?boiler     rdf:type/rdfs:subClassOf?   brick:Boiler .
    ?boiler     brick:feeds+                ?t_unit .
    ?t_unit     rdf:type                    ?equip_type .
    ?mid_equip  brick:feeds                 ?t_unit .
    ?t_unit     brick:feeds+                ?room_space .
    ?room_space rdf:type/rdfs:subClassOf?   brick:HVAC_Zone .

    FILTER NOT EXISTS {
        ?subtype ^a ?t_unit ;
            (rdfs:subClassOf|^owl:equivalentClass)* ?equip_type .
        FILTER ( ?subtype != ?equip_type )
    }
}"#;

/// Retrieves the hot-water consumers of the building together with their boilers
/// and the zones they serve.
///
/// An empty model or a model without matching equipment yields an empty vector.
pub fn query_hot_water_consumers(graph: &BuildingGraph) -> Result<Vec<TopologyRow>, GraphError> {
    info!("Retrieving hot water consumers for each boiler");

    let rows = graph
        .select(HOT_WATER_CONSUMERS_QUERY)?
        .iter()
        .map(|solution| {
            Ok(TopologyRow {
                boiler: binding(solution, "boiler")?,
                t_unit: binding(solution, "t_unit")?,
                equip_type: binding(solution, "equip_type")?,
                subtype: optional_binding(solution, "subtype"),
                mid_equip: binding(solution, "mid_equip")?,
                room_space: binding(solution, "room_space")?,
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    if rows.is_empty() {
        warn!("Topology query matched no boiler -> terminal unit -> zone paths");
    } else {
        info!("Topology query returned {} rows", rows.len());
    }
    Ok(rows)
}
