use serde::{Deserialize, Serialize};

/// A sensor or command point discovered on a piece of equipment (or a zone),
/// together with the BACnet details needed to find it in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Brick class the point was requested as (e.g. `...#Position_Sensor`).
    pub point_type: String,
    /// IRI of the point itself.
    pub point: String,
    /// IRI of the entity the point belongs to.
    pub host: String,
    /// IRI of the BACnet reference node.
    pub bacnet_id: String,
    /// BACnet device instance in integer decimal form. Join key against the archive paths.
    pub device_instance: String,
    pub device_type: String,
    /// IRI of the network node the device is accessed at.
    pub network: String,
    /// Connection string of that network.
    pub address: String,
    pub unit: Option<String>,
}

/// Last segment of an IRI, after `#` or `/`.
///
/// ```
/// use hot_water_reset::local_name;
///
/// assert_eq!(local_name("https://brickschema.org/schema/Brick#Boiler"), "Boiler");
/// assert_eq!(local_name("urn:bldg/AHU_1"), "AHU_1");
/// assert_eq!(local_name("plain"), "plain");
/// ```
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}
