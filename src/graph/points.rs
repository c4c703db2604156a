use crate::graph::building_graph::{binding, iri_ref, optional_binding, BuildingGraph};
use crate::graph::error::GraphError;
use crate::types::point::PointRecord;
use log::{debug, info};
use std::collections::HashSet;

/// Returns the points of the requested Brick classes that belong to `entity`,
/// with their BACnet reference, device instance, network address and unit.
///
/// `point_types` accepts prefixed names (`brick:Position_Sensor`) or full IRIs.
/// Rows are deduplicated by point identity (first occurrence wins) and ordered
/// by the position of their class in `point_types`, then by point IRI.
pub fn entity_points(
    graph: &BuildingGraph,
    entity: &str,
    point_types: &[String],
) -> Result<Vec<PointRecord>, GraphError> {
    if point_types.is_empty() {
        return Ok(Vec::new());
    }

    let expanded: Vec<String> = point_types.iter().map(|t| graph.expand(t)).collect();
    let values = expanded
        .iter()
        .map(|t| iri_ref(t))
        .collect::<Result<Vec<_>, _>>()?
        .join(" ");
    let entity_ref = iri_ref(entity)?;

    let query = format!(
        r#"SELECT DISTINCT * WHERE {{
    VALUES ?req_point {{ {values} }}
    VALUES ?t_unit {{ {entity_ref} }}
    ?point_name     rdf:type                        ?req_point .
    ?point_name     brick:isPointOf                 ?t_unit .
    ?point_name     brick:bacnetPoint               ?bacnet_id .
    ?bacnet_id      brick:hasBacnetDeviceInstance   ?bacnet_instance .
    ?bacnet_id      brick:hasBacnetDeviceType       ?bacnet_type .
    ?bacnet_id      brick:accessedAt                ?bacnet_net .
    ?bacnet_net     dbc:connstring                  ?bacnet_addr .
    OPTIONAL {{ ?point_name brick:hasUnit ?val_unit }}
}}
ORDER BY ?point_name ?val_unit"#
    );

    let rows = graph
        .select(&query)?
        .iter()
        .map(|solution| {
            let point = binding(solution, "point_name")?;
            let raw_instance = binding(solution, "bacnet_instance")?;
            let unit = optional_binding(solution, "val_unit");

            Ok(PointRecord {
                point_type: binding(solution, "req_point")?,
                device_instance: normalize_device_instance(&point, &raw_instance)?,
                host: binding(solution, "t_unit")?,
                bacnet_id: binding(solution, "bacnet_id")?,
                device_type: binding(solution, "bacnet_type")?,
                network: binding(solution, "bacnet_net")?,
                address: binding(solution, "bacnet_addr")?,
                unit,
                point,
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    let mut points = dedupe_by_point(rows);
    points.sort_by_key(|p| {
        expanded
            .iter()
            .position(|t| t == &p.point_type)
            .unwrap_or(usize::MAX)
    });
    debug!("{} points found on {}", points.len(), entity);
    Ok(points)
}

/// Runs [`entity_points`] once per entity and concatenates the results in entity order.
pub fn discover_points(
    graph: &BuildingGraph,
    entities: &[String],
    point_types: &[String],
) -> Result<Vec<PointRecord>, GraphError> {
    let mut points = Vec::new();
    for entity in entities {
        points.extend(entity_points(graph, entity, point_types)?);
    }
    info!(
        "Discovered {} points of {:?} across {} entities",
        points.len(),
        point_types,
        entities.len()
    );
    Ok(points)
}

/// Keeps the first row for every distinct point IRI, preserving order.
pub fn dedupe_by_point(rows: Vec<PointRecord>) -> Vec<PointRecord> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.point.clone()))
        .collect()
}

/// Normalizes a BACnet device instance to its integer decimal form.
/// `"3000112"`, `3000112` and `3000112.0` all become `"3000112"`.
pub(crate) fn normalize_device_instance(point: &str, raw: &str) -> Result<String, GraphError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok((value as i64).to_string()),
        _ => Err(GraphError::InvalidDeviceInstance {
            point: point.to_string(),
            value: raw.to_string(),
        }),
    }
}
