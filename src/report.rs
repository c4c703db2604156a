//! Report definitions: which hosts to look at, which point types to chart, and
//! where the charts go.

use crate::metadata::{unique_boilers, unique_terminal_units, unique_zones};
use crate::types::consumer::{ConsumerRecord, TopologyRow};
use crate::types::point::PointRecord;
use serde::{Deserialize, Serialize};

/// The kind of entity whose points a report collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostRole {
    TerminalUnit,
    Boiler,
    Zone,
}

impl HostRole {
    /// Entities of this role, in first-seen order. Zones come from the raw
    /// topology rows so that no served zone is lost to consumer deduplication.
    pub fn hosts(&self, consumers: &[ConsumerRecord], rows: &[TopologyRow]) -> Vec<String> {
        match self {
            HostRole::TerminalUnit => unique_terminal_units(consumers),
            HostRole::Boiler => unique_boilers(consumers),
            HostRole::Zone => unique_zones(rows),
        }
    }
}

/// One chart file of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutput {
    /// File name, relative to the output directory.
    pub file: String,
    /// Keep only points whose host IRI contains this text.
    #[serde(default)]
    pub host_contains: Option<String>,
}

impl ReportOutput {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            host_contains: None,
        }
    }

    pub fn for_hosts_containing(file: impl Into<String>, host_contains: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            host_contains: Some(host_contains.into()),
        }
    }

    pub fn accepts(&self, point: &PointRecord) -> bool {
        self.host_contains
            .as_deref()
            .map_or(true, |needle| point.host.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    pub hosts: HostRole,
    /// Brick classes, as `brick:Name` or full IRIs.
    pub point_types: Vec<String>,
    /// Archive point names containing any of these are left off the chart.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub y_range: Option<(f64, f64)>,
    #[serde(default)]
    pub legend_font_size: Option<usize>,
    /// Draw every point on one chart with this label.
    #[serde(default)]
    pub single_chart: Option<String>,
    pub outputs: Vec<ReportOutput>,
}

impl Report {
    fn new(name: &str, hosts: HostRole, point_types: &[&str], outputs: Vec<ReportOutput>) -> Self {
        Self {
            name: name.to_string(),
            hosts,
            point_types: point_types.iter().map(|t| format!("brick:{t}")).collect(),
            exclude: Vec::new(),
            y_range: None,
            legend_font_size: None,
            single_chart: None,
            outputs,
        }
    }
}

/// Control, boiler, discharge and zone temperature reports.
pub fn default_reports() -> Vec<Report> {
    vec![
        Report {
            exclude: vec!["REV".into(), "DPR".into(), "D-O".into()],
            ..Report::new(
                "consumer control",
                HostRole::TerminalUnit,
                &["Position_Sensor", "Valve_Command"],
                vec![ReportOutput::new("hw_consumer_ctrl.html")],
            )
        },
        Report {
            y_range: Some((0.0, 200.0)),
            legend_font_size: Some(10),
            single_chart: Some("Boiler temperatures".into()),
            ..Report::new(
                "boiler temps",
                HostRole::Boiler,
                &[
                    "Hot_Water_Supply_Temperature_Sensor",
                    "Return_Water_Temperature_Sensor",
                    "Supply_Water_Temperature_Setpoint",
                ],
                vec![ReportOutput::new("boiler_temps.html")],
            )
        },
        Report::new(
            "discharge temps",
            HostRole::TerminalUnit,
            &["Supply_Air_Temperature_Sensor", "Embedded_Temperature_Sensor"],
            vec![ReportOutput::new("hw_consumer_discharge_temps.html")],
        ),
        Report::new(
            "zone temps",
            HostRole::Zone,
            &["Zone_Air_Temperature_Sensor", "Air_Temperature_Setpoint"],
            vec![
                ReportOutput::for_hosts_containing("air_zone_temps.html", "Air_Zone"),
                ReportOutput::for_hosts_containing("rad_zone_temps.html", "Radiant_Zone"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reports() {
        let reports = default_reports();
        let files: Vec<&str> = reports
            .iter()
            .flat_map(|r| r.outputs.iter().map(|o| o.file.as_str()))
            .collect();
        assert_eq!(
            files,
            vec![
                "hw_consumer_ctrl.html",
                "boiler_temps.html",
                "hw_consumer_discharge_temps.html",
                "air_zone_temps.html",
                "rad_zone_temps.html",
            ]
        );
        assert_eq!(reports[0].point_types[1], "brick:Valve_Command");
        assert_eq!(reports[1].y_range, Some((0.0, 200.0)));
    }

    #[test]
    fn test_report_from_toml() -> Result<(), toml::de::Error> {
        let report: Report = toml::from_str(
            r#"
            name = "boilers"
            hosts = "boiler"
            point_types = ["brick:Hot_Water_Supply_Temperature_Sensor"]
            y_range = [0.0, 120.0]
            outputs = [{ file = "b.html" }, { file = "a.html", host_contains = "BLR_A" }]
            "#,
        )?;

        assert_eq!(report.hosts, HostRole::Boiler);
        assert_eq!(report.y_range, Some((0.0, 120.0)));
        assert!(report.exclude.is_empty());
        assert_eq!(report.outputs[1].host_contains.as_deref(), Some("BLR_A"));
        Ok(())
    }

    #[test]
    fn test_output_host_filter() {
        let mut point = PointRecord {
            point_type: "https://brickschema.org/schema/Brick#Zone_Air_Temperature_Sensor".into(),
            point: "urn:bldg/T1".into(),
            host: "urn:bldg/Radiant_Zone_Y".into(),
            bacnet_id: "urn:bldg/T1_bn".into(),
            device_instance: "1".into(),
            device_type: "analog-input".into(),
            network: "urn:bldg/NET_1".into(),
            address: "192.168.1.10:47808".into(),
            unit: None,
        };
        let air = ReportOutput::for_hosts_containing("air.html", "Air_Zone");

        assert!(!air.accepts(&point));
        assert!(ReportOutput::new("all.html").accepts(&point));
        point.host = "urn:bldg/Air_Zone_X".into();
        assert!(air.accepts(&point));
    }
}
