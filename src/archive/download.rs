//! Joining discovered points onto archive paths, and downloading their readings
//! in batches.

use crate::archive::client::ArchiveClient;
use crate::archive::error::ArchiveError;
use crate::archive::paths::PathTable;
use crate::types::point::PointRecord;
use crate::types::time_series::{TimeSeries, TimeWindow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_BATCH_SIZE: usize = 20;

/// A discovered point matched to one archive stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub point: PointRecord,
    pub uuid: String,
    pub path: String,
    /// Point name as it appears in the archive path; used for legends.
    pub path_point_name: String,
}

/// Outcome of joining points onto the path table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedPoint>,
    /// Points whose device instance matched no archive path.
    pub unresolved: Vec<PointRecord>,
}

impl Resolution {
    pub fn uuids(&self) -> Vec<String> {
        self.resolved.iter().map(|r| r.uuid.clone()).collect()
    }
}

/// Joins points onto the path table by device instance.
///
/// The table is first narrowed to the requested device instances. Output follows
/// point order; a point matching several streams yields one row per stream in
/// table order. Every emitted uuid comes from the table, and points with no
/// match are returned in [`Resolution::unresolved`] instead of being dropped.
pub fn resolve_paths(points: &[PointRecord], table: &PathTable) -> Resolution {
    let requested: HashSet<&str> = points.iter().map(|p| p.device_instance.as_str()).collect();
    let candidates = table.for_instances(&requested);

    let mut resolution = Resolution::default();
    for point in points {
        let mut matched = false;
        for entry in candidates
            .iter()
            .filter(|e| e.device_instance == point.device_instance)
        {
            matched = true;
            resolution.resolved.push(ResolvedPoint {
                point: point.clone(),
                uuid: entry.uuid.clone(),
                path: entry.path.clone(),
                path_point_name: entry.point_name.clone(),
            });
        }
        if !matched {
            resolution.unresolved.push(point.clone());
        }
    }

    if !resolution.unresolved.is_empty() {
        warn!(
            "{} points have no archive path: {:?}",
            resolution.unresolved.len(),
            resolution
                .unresolved
                .iter()
                .map(|p| p.point.as_str())
                .collect::<Vec<_>>()
        );
    }
    resolution
}

/// Resolved points paired with their readings. Both vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadedPoints {
    points: Vec<ResolvedPoint>,
    series: Vec<TimeSeries>,
}

impl DownloadedPoints {
    /// Returns `None` when the two vectors differ in length.
    pub fn new(points: Vec<ResolvedPoint>, series: Vec<TimeSeries>) -> Option<Self> {
        (points.len() == series.len()).then_some(Self { points, series })
    }

    pub fn points(&self) -> &[ResolvedPoint] {
        &self.points
    }

    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResolvedPoint, &TimeSeries)> {
        self.points.iter().zip(self.series.iter())
    }

    /// Keeps the pairs whose point satisfies `predicate`.
    pub fn filter(&self, predicate: impl Fn(&ResolvedPoint) -> bool) -> DownloadedPoints {
        let (points, series) = self
            .iter()
            .filter(|pair| predicate(pair.0))
            .map(|(point, series)| (point.clone(), series.clone()))
            .unzip();
        DownloadedPoints { points, series }
    }

    /// Appends another download, keeping order.
    pub fn extend(&mut self, other: DownloadedPoints) {
        self.points.extend(other.points);
        self.series.extend(other.series);
    }
}

/// Downloads readings for every resolved point over `window`.
///
/// Uuids are requested in batches of at most `batch_size`. When a batch fails, the
/// ceiling is halved and the same uuids are retried, so a limit the archive does
/// not advertise is found on the fly. A request for a single uuid that still fails
/// is returned as [`ArchiveError::BatchFailed`]. Failures a smaller request cannot
/// fix (see [`ArchiveError::may_be_batch_size`]) are returned straight away.
pub async fn download(
    client: &impl ArchiveClient,
    resolved: Vec<ResolvedPoint>,
    window: &TimeWindow,
    batch_size: usize,
) -> Result<DownloadedPoints, ArchiveError> {
    let uuids: Vec<String> = resolved.iter().map(|r| r.uuid.clone()).collect();
    let mut series = Vec::with_capacity(uuids.len());
    let mut ceiling = batch_size.max(1);
    let mut offset = 0;

    while offset < uuids.len() {
        let end = (offset + ceiling).min(uuids.len());
        let batch = &uuids[offset..end];

        match client.data_uuid(batch, window).await {
            Ok(fetched) if fetched.len() == batch.len() => {
                series.extend(fetched);
                offset = end;
            }
            Ok(fetched) => {
                return Err(ArchiveError::SeriesCountMismatch {
                    expected: batch.len(),
                    found: fetched.len(),
                });
            }
            Err(e) if !e.may_be_batch_size() => return Err(e),
            Err(e) if batch.len() > 1 => {
                ceiling = batch.len() / 2;
                warn!(
                    "Request for {} uuids failed ({}); retrying with batches of {}",
                    batch.len(),
                    e,
                    ceiling
                );
            }
            Err(e) => {
                return Err(ArchiveError::BatchFailed {
                    uuid: batch[0].clone(),
                    source: Box::new(e),
                });
            }
        }
    }

    info!(
        "Downloaded {} series ({} readings)",
        series.len(),
        series.iter().map(TimeSeries::len).sum::<usize>()
    );
    Ok(DownloadedPoints {
        points: resolved,
        series,
    })
}
