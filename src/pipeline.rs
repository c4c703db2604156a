//! End-to-end run: topology, consumer cleanup, point discovery, download and
//! rendering for every configured report.

use crate::archive::client::{ArchiveClient, SmapClient};
use crate::archive::download::{download, resolve_paths, DEFAULT_BATCH_SIZE};
use crate::archive::paths::{fetch_path_table, PathTable};
use crate::config::AppConfig;
use crate::error::HotWaterError;
use crate::graph::building_graph::BuildingGraph;
use crate::graph::points::discover_points;
use crate::graph::topology::query_hot_water_consumers;
use crate::metadata::clean_consumers;
use crate::render::chart::render_points;
use crate::render::export::{consumers_frame, export_csv, points_frame, readings_frame};
use crate::report::{default_reports, Report};
use crate::types::consumer::{ConsumerRecord, TopologyRow};
use crate::types::time_series::TimeWindow;
use crate::utils::ensure_output_dir;
use bon::bon;
use log::info;
use std::path::{Path, PathBuf};

pub const CONSUMERS_CSV: &str = "hw_consumers.csv";

/// What one report produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub name: String,
    /// Resolved point/stream pairs that were downloaded.
    pub series: usize,
    /// Points without an archive stream.
    pub unresolved: usize,
    /// Files written for this report, charts and CSVs.
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub consumers: usize,
    pub reports: Vec<ReportSummary>,
}

pub struct Pipeline<C> {
    client: C,
    graph: BuildingGraph,
    window: TimeWindow,
    output_dir: PathBuf,
    source_name: String,
    batch_size: usize,
    export_csv: bool,
    reports: Vec<Report>,
}

#[bon]
impl<C: ArchiveClient> Pipeline<C> {
    #[builder]
    pub fn new(
        client: C,
        graph: BuildingGraph,
        window: TimeWindow,
        #[builder(into)] output_dir: PathBuf,
        #[builder(into)] source_name: String,
        batch_size: Option<usize>,
        export_csv: Option<bool>,
        reports: Option<Vec<Report>>,
    ) -> Self {
        Self {
            client,
            graph,
            window,
            output_dir,
            source_name,
            batch_size: batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            export_csv: export_csv.unwrap_or(true),
            reports: reports.unwrap_or_else(default_reports),
        }
    }
}

impl Pipeline<SmapClient> {
    /// Loads the building model and connects to the archive described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, HotWaterError> {
        let client = SmapClient::builder()
            .base_url(config.archive.url.as_str())
            .key(config.archive.key.as_str())
            .timeout(config.archive.timeout)
            .build()?;
        let graph = BuildingGraph::load(&config.graph.model_file, config.graph.namespaces.clone())?;

        Ok(Pipeline::builder()
            .client(client)
            .graph(graph)
            .window(config.window)
            .output_dir(config.output.dir.clone())
            .source_name(config.archive.source_name.as_str())
            .batch_size(config.archive.batch_size)
            .export_csv(config.output.export_csv)
            .reports(config.reports.clone())
            .build())
    }
}

impl<C: ArchiveClient> Pipeline<C> {
    pub async fn run(&self) -> Result<RunSummary, HotWaterError> {
        ensure_output_dir(&self.output_dir).await?;

        let table = fetch_path_table(&self.client, &self.source_name).await?;
        let rows = query_hot_water_consumers(&self.graph)?;
        let consumers = clean_consumers(rows.clone());
        info!(
            "{} hot water consumers across {} topology rows",
            consumers.len(),
            rows.len()
        );

        if self.export_csv {
            export_csv(&self.output_dir.join(CONSUMERS_CSV), || {
                consumers_frame(&consumers)
            })?;
        }

        let mut reports = Vec::with_capacity(self.reports.len());
        for report in &self.reports {
            reports.push(self.run_report(report, &consumers, &rows, &table).await?);
        }

        Ok(RunSummary {
            consumers: consumers.len(),
            reports,
        })
    }

    async fn run_report(
        &self,
        report: &Report,
        consumers: &[ConsumerRecord],
        rows: &[TopologyRow],
        table: &PathTable,
    ) -> Result<ReportSummary, HotWaterError> {
        info!("Report '{}'", report.name);
        let hosts = report.hosts.hosts(consumers, rows);
        let points = discover_points(&self.graph, &hosts, &report.point_types)?;
        let resolution = resolve_paths(&points, table);
        let unresolved = resolution.unresolved.len();
        let downloaded = download(
            &self.client,
            resolution.resolved,
            &self.window,
            self.batch_size,
        )
        .await?;

        let mut files = Vec::new();
        for output in &report.outputs {
            let selected = downloaded.filter(|p| output.accepts(&p.point));
            let path = self.output_dir.join(&output.file);

            let written = render_points()
                .downloaded(&selected)
                .window(&self.window)
                .output(&path)
                .exclude(&report.exclude)
                .maybe_y_range(report.y_range)
                .maybe_legend_font_size(report.legend_font_size)
                .maybe_single_chart(report.single_chart.as_deref())
                .call()?;
            files.extend(written);

            if self.export_csv && !selected.is_empty() {
                let points_path = sibling(&path, "points.csv");
                export_csv(&points_path, || points_frame(selected.points()))?;
                files.push(points_path);

                let readings_path = sibling(&path, "readings.csv");
                export_csv(&readings_path, || readings_frame(&selected, &self.window))?;
                files.push(readings_path);
            }
        }

        Ok(ReportSummary {
            name: report.name.clone(),
            series: downloaded.len(),
            unresolved,
            files,
        })
    }
}

/// `out/boiler_temps.html` + `points.csv` -> `out/boiler_temps_points.csv`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::client::TagRecord;
    use crate::archive::mock::MockArchive;
    use crate::graph::building_graph::Namespaces;
    use crate::graph::error::GraphError;
    use crate::graph::test_models::TWO_BOILER_MODEL;
    use crate::report::{HostRole, ReportOutput};
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2021, 9, 9, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 9, 17, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn archive() -> MockArchive {
        let streams = [
            ("u-pos-x", "/FS4/bms/3000112/bms2/VAV-X POS"),
            ("u-cmd-x", "/FS4/bms/3000113/bms2/VAV-X CMD"),
            ("u-rev-x", "/FS4/bms/3000113/bms2/REV-X CMD"),
            ("u-pos-y", "/FS4/bms/3000212/bms2/VAV-Y POS"),
            ("u-hwst", "/FS4/bms/3000001/bms2/BLR-A HWST"),
            ("u-zn-x", "/FS4/bms/3000301/bms2/ZN-X T"),
            ("u-other", "/FS4/bms/3999999/bms2/UNUSED"),
        ];
        let uuids: Vec<String> = streams.iter().map(|(u, _)| u.to_string()).collect();
        MockArchive {
            tags: streams
                .iter()
                .map(|(uuid, path)| TagRecord {
                    uuid: uuid.to_string(),
                    path: Some(path.to_string()),
                })
                .collect(),
            ..MockArchive::with_readings(&uuids, &window())
        }
    }

    /// The default reports minus discharge temperatures, whose test model point
    /// carries a non-numeric device instance.
    fn reports() -> Vec<Report> {
        default_reports()
            .into_iter()
            .filter(|r| r.name != "discharge temps")
            .collect()
    }

    fn pipeline(output_dir: &Path, reports: Vec<Report>) -> Result<Pipeline<MockArchive>, GraphError> {
        Ok(Pipeline::builder()
            .client(archive())
            .graph(BuildingGraph::from_turtle(TWO_BOILER_MODEL, Namespaces::default())?)
            .window(window())
            .output_dir(output_dir)
            .source_name("Field Study 4")
            .batch_size(2)
            .reports(reports)
            .build())
    }

    #[tokio::test]
    async fn test_run_writes_reports() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("out");

        let summary = pipeline(&out, reports())?.run().await?;

        assert_eq!(summary.consumers, 3);
        assert_eq!(summary.reports.len(), 3);

        let control = &summary.reports[0];
        assert_eq!(control.series, 4);
        assert_eq!(control.unresolved, 0);
        let html = std::fs::read_to_string(out.join("hw_consumer_ctrl.html"))?;
        for name in ["VAV-X POS", "VAV-Y POS", "VAV-X CMD"] {
            assert!(html.contains(name), "{name} missing from chart");
        }
        assert!(!html.contains("REV-X CMD"));

        let boiler = std::fs::read_to_string(out.join("boiler_temps.html"))?;
        assert!(boiler.contains("BLR-A HWST"));
        assert!(boiler.contains("Boiler temperatures"));
        assert!(boiler.contains(r#""range":[0.0,200.0]"#));

        assert!(out.join("air_zone_temps.html").exists());
        assert!(!out.join("rad_zone_temps.html").exists());

        let consumers_csv = std::fs::read_to_string(out.join(CONSUMERS_CSV))?;
        assert_eq!(consumers_csv.lines().count(), 4);
        assert!(out.join("hw_consumer_ctrl_points.csv").exists());
        assert!(out.join("hw_consumer_ctrl_readings.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_run_without_csv_and_unresolved_points() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let zones = Report {
            name: "zones".into(),
            hosts: HostRole::Zone,
            point_types: vec!["brick:Zone_Air_Temperature_Sensor".into()],
            exclude: Vec::new(),
            y_range: None,
            legend_font_size: None,
            single_chart: None,
            outputs: vec![ReportOutput::new("zones.html")],
        };
        let mut pipeline = pipeline(dir.path(), vec![zones])?;
        pipeline.export_csv = false;
        pipeline.client.tags.retain(|t| t.uuid != "u-zn-x");

        let summary = pipeline.run().await?;

        assert_eq!(summary.reports[0].series, 0);
        assert_eq!(summary.reports[0].unresolved, 1);
        assert!(summary.reports[0].files.is_empty());
        assert!(!dir.path().join(CONSUMERS_CSV).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_device_instance_fails_the_run() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let discharge: Vec<Report> = default_reports()
            .into_iter()
            .filter(|r| r.name == "discharge temps")
            .collect();

        let result = pipeline(dir.path(), discharge)?.run().await;

        assert!(matches!(
            result,
            Err(HotWaterError::Graph(GraphError::InvalidDeviceInstance { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_sibling_paths() {
        assert_eq!(
            sibling(Path::new("out/boiler_temps.html"), "points.csv"),
            PathBuf::from("out/boiler_temps_points.csv")
        );
    }
}
