use serde::{Deserialize, Serialize};

/// An archive stream identified by its uuid, with its slash-delimited path split
/// into components.
///
/// Paths have the shape `/site/subsystem/device_instance/subsystem2/point_name`.
///
/// ```
/// use hot_water_reset::PathEntry;
///
/// let entry = PathEntry::parse("6f0c", "/Field Study 4/bms/3000112/bms2/VAV-101 DAT").unwrap();
/// assert_eq!(entry.device_instance, "3000112");
/// assert_eq!(entry.point_name, "VAV-101 DAT");
/// assert!(PathEntry::parse("6f0c", "/too/short").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub uuid: String,
    pub path: String,
    pub site: String,
    pub subsystem: String,
    pub device_instance: String,
    pub subsystem2: String,
    pub point_name: String,
}

impl PathEntry {
    /// Splits `path` into its components. Returns `None` unless the path has exactly
    /// five components after the leading slash.
    pub fn parse(uuid: &str, path: &str) -> Option<Self> {
        let mut parts = path.split('/');
        if !parts.next()?.is_empty() {
            return None;
        }
        let site = parts.next()?;
        let subsystem = parts.next()?;
        let device_instance = parts.next()?;
        let subsystem2 = parts.next()?;
        let point_name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            uuid: uuid.to_string(),
            path: path.to_string(),
            site: site.to_string(),
            subsystem: subsystem.to_string(),
            device_instance: device_instance.to_string(),
            subsystem2: subsystem2.to_string(),
            point_name: point_name.to_string(),
        })
    }
}
