//! Stacked step-line charts of downloaded points, one chart per point type,
//! written to a standalone HTML file.

use crate::archive::download::{DownloadedPoints, ResolvedPoint};
use crate::render::error::RenderError;
use crate::render::palette::series_color;
use crate::types::point::local_name;
use crate::types::time_series::{TimeSeries, TimeWindow};
use bon::builder;
use log::{info, warn};
use plotly::common::{Font, Line, LineShape, Mode, Title};
use plotly::layout::{Axis, AxisType, GridPattern, Layout, LayoutGrid, Legend, RowOrder};
use plotly::{Plot, Scatter};
use std::path::{Path, PathBuf};

/// Charts that fit in one file; each one takes its own y axis.
pub const MAX_CHARTS: usize = 8;
pub const DEFAULT_LEGEND_FONT_SIZE: usize = 6;
const CHART_HEIGHT: usize = 400;
const PLOT_WIDTH: usize = 1500;

/// One chart: a label and the series drawn on it.
#[derive(Debug)]
struct Chart<'a> {
    label: String,
    /// Palette slot, point and readings. Excluded points keep their slot.
    members: Vec<(usize, &'a ResolvedPoint, &'a TimeSeries)>,
}

/// Groups the pairs by point type in first-seen order, or puts everything on a
/// single chart when `single_label` is set.
fn group_charts<'a>(
    downloaded: &'a DownloadedPoints,
    single_label: Option<&str>,
) -> Vec<Chart<'a>> {
    let mut charts: Vec<(String, Chart<'a>)> = Vec::new();

    for (point, series) in downloaded.iter() {
        let key = match single_label {
            Some(label) => label.to_string(),
            None => point.point.point_type.clone(),
        };
        let index = match charts.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                let label = match single_label {
                    Some(label) => label.to_string(),
                    None => local_name(&key).to_string(),
                };
                charts.push((
                    key,
                    Chart {
                        label,
                        members: Vec::new(),
                    },
                ));
                charts.len() - 1
            }
        };
        let chart = &mut charts[index].1;
        let slot = chart.members.len();
        chart.members.push((slot, point, series));
    }

    charts.into_iter().map(|(_, chart)| chart).collect()
}

fn is_excluded(point: &ResolvedPoint, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|pattern| point.path_point_name.contains(pattern.as_str()))
}

fn trace(
    slot: usize,
    point: &ResolvedPoint,
    series: &TimeSeries,
    chart_index: usize,
) -> Box<Scatter<String, f64>> {
    let (x, y): (Vec<String>, Vec<f64>) = series
        .readings
        .iter()
        .filter_map(|reading| {
            reading
                .datetime()
                .map(|dt| (dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(), reading.value))
        })
        .unzip();

    Scatter::new(x, y)
        .name(&point.path_point_name)
        .mode(Mode::Lines)
        .line(
            Line::new()
                .shape(LineShape::Hv)
                .color(series_color(slot))
                .width(2.0),
        )
        .x_axis("x")
        .y_axis(axis_ref(chart_index))
}

fn axis_ref(chart_index: usize) -> String {
    match chart_index {
        0 => "y".to_string(),
        n => format!("y{}", n + 1),
    }
}

fn with_y_axis(layout: Layout, chart_index: usize, axis: Axis) -> Layout {
    match chart_index {
        0 => layout.y_axis(axis),
        1 => layout.y_axis2(axis),
        2 => layout.y_axis3(axis),
        3 => layout.y_axis4(axis),
        4 => layout.y_axis5(axis),
        5 => layout.y_axis6(axis),
        6 => layout.y_axis7(axis),
        _ => layout.y_axis8(axis),
    }
}

/// Builds the figure. Returns `Ok(None)` when there is nothing to draw.
fn build_plot(
    downloaded: &DownloadedPoints,
    window: &TimeWindow,
    exclude: &[String],
    y_range: Option<(f64, f64)>,
    legend_font_size: usize,
    single_chart: Option<&str>,
) -> Result<Option<Plot>, RenderError> {
    let charts = group_charts(downloaded, single_chart);
    if charts.is_empty() {
        return Ok(None);
    }
    if charts.len() > MAX_CHARTS {
        return Err(RenderError::TooManyCharts {
            charts: charts.len(),
            max: MAX_CHARTS,
        });
    }

    let mut plot = Plot::new();
    let mut layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(charts.len())
                .columns(1)
                .pattern(GridPattern::Coupled)
                .row_order(RowOrder::TopToBottom),
        )
        .height(CHART_HEIGHT * charts.len())
        .width(PLOT_WIDTH)
        .legend(Legend::new().font(Font::new().size(legend_font_size)))
        .x_axis(
            Axis::new()
                .type_(AxisType::Date)
                .range(vec![window.start_ms() as f64, window.end_ms() as f64]),
        );

    for (chart_index, chart) in charts.iter().enumerate() {
        for (slot, point, series) in &chart.members {
            if is_excluded(point, exclude) {
                continue;
            }
            plot.add_trace(trace(*slot, point, series, chart_index));
        }

        let mut axis = Axis::new().title(Title::with_text(&chart.label));
        if let Some((low, high)) = y_range {
            axis = axis.range(vec![low, high]);
        }
        layout = with_y_axis(layout, chart_index, axis);
    }

    plot.set_layout(layout);
    Ok(Some(plot))
}

/// Renders downloaded points as stacked step-line charts into `output`.
///
/// Points are grouped into one chart per point type, in the order the types first
/// appear, and colored by their position within the chart. Points whose archive
/// name contains an entry of `exclude` are not drawn but keep their color slot, so the
/// remaining colors do not shift between runs. `single_chart` puts every point on
/// one chart with that label.
///
/// Returns the written path, or `Ok(None)` without touching the file system when
/// there is nothing to draw.
#[builder]
pub fn render_points(
    downloaded: &DownloadedPoints,
    window: &TimeWindow,
    output: &Path,
    exclude: Option<&[String]>,
    y_range: Option<(f64, f64)>,
    legend_font_size: Option<usize>,
    single_chart: Option<&str>,
) -> Result<Option<PathBuf>, RenderError> {
    let plot = build_plot(
        downloaded,
        window,
        exclude.unwrap_or_default(),
        y_range,
        legend_font_size.unwrap_or(DEFAULT_LEGEND_FONT_SIZE),
        single_chart,
    )?;

    let Some(plot) = plot else {
        warn!("Nothing to draw for {}", output.display());
        return Ok(None);
    };

    std::fs::write(output, plot.to_html())
        .map_err(|e| RenderError::Write(output.to_path_buf(), e))?;
    info!(
        "Wrote {} series to {}",
        downloaded.len(),
        output.display()
    );
    Ok(Some(output.to_path_buf()))
}
