//! CSV export of the consumer table, resolved points and readings.

use crate::archive::download::{DownloadedPoints, ResolvedPoint};
use crate::render::error::RenderError;
use crate::types::consumer::ConsumerRecord;
use crate::types::time_series::{TimeSeries, TimeWindow};
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub fn consumers_frame(consumers: &[ConsumerRecord]) -> PolarsResult<DataFrame> {
    let column = |f: fn(&ConsumerRecord) -> &str| -> Vec<String> {
        consumers.iter().map(|c| f(c).to_string()).collect()
    };
    df!(
        "boiler" => column(|c| &c.boiler),
        "mid_equip" => column(|c| &c.mid_equip),
        "t_unit" => column(|c| &c.t_unit),
        "equip_type" => column(|c| &c.equip_type),
        "room_space" => column(|c| &c.room_space),
        "consumer_type" => column(|c| c.consumer_type.as_str()),
    )
}

/// One row per resolved point, with the archive stream it was matched to.
pub fn points_frame(points: &[ResolvedPoint]) -> PolarsResult<DataFrame> {
    let column = |f: fn(&ResolvedPoint) -> &str| -> Vec<String> {
        points.iter().map(|p| f(p).to_string()).collect()
    };
    let units: Vec<Option<String>> = points.iter().map(|p| p.point.unit.clone()).collect();
    df!(
        "point_type" => column(|p| &p.point.point_type),
        "point" => column(|p| &p.point.point),
        "host" => column(|p| &p.point.host),
        "bacnet_id" => column(|p| &p.point.bacnet_id),
        "device_instance" => column(|p| &p.point.device_instance),
        "device_type" => column(|p| &p.point.device_type),
        "network" => column(|p| &p.point.network),
        "address" => column(|p| &p.point.address),
        "unit" => units,
        "uuid" => column(|p| &p.uuid),
        "path" => column(|p| &p.path),
        "point_name" => column(|p| &p.path_point_name),
    )
}

/// Readings of every downloaded point in long format
/// (`uuid`, `point_name`, `timestamp`, `value`), restricted to `window`.
pub fn readings_frame(
    downloaded: &DownloadedPoints,
    window: &TimeWindow,
) -> PolarsResult<DataFrame> {
    let mut frames = downloaded
        .iter()
        .map(|(point, series)| labelled(series, &point.uuid, &point.path_point_name, window))
        .collect::<PolarsResult<Vec<LazyFrame>>>()?;
    if frames.is_empty() {
        frames.push(labelled(&TimeSeries::default(), "", "", window)?);
    }

    concat(frames, UnionArgs::default())?.collect()
}

fn labelled(
    series: &TimeSeries,
    uuid: &str,
    point_name: &str,
    window: &TimeWindow,
) -> PolarsResult<LazyFrame> {
    Ok(series
        .frame_within(window)?
        .lazy()
        .with_columns([lit(uuid).alias("uuid"), lit(point_name).alias("point_name")])
        .select([col("uuid"), col("point_name"), col("timestamp"), col("value")]))
}

/// Writes `frame` to `path` as CSV with a header row.
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), RenderError> {
    let mut file = File::create(path).map_err(|e| RenderError::Write(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .map_err(|e| RenderError::Csv(path.to_path_buf(), e))?;
    info!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Builds a frame with `build` and writes it to `path`.
pub fn export_csv(
    path: &Path,
    build: impl FnOnce() -> PolarsResult<DataFrame>,
) -> Result<(), RenderError> {
    let mut frame = build().map_err(|e| RenderError::Frame(path.to_path_buf(), e))?;
    write_csv(&mut frame, path)
}
