//! In-memory archive used by the download and pipeline tests.

use crate::archive::client::{ArchiveClient, TagRecord};
use crate::archive::error::ArchiveError;
use crate::types::time_series::{Reading, TimeSeries, TimeWindow};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MockArchive {
    pub tags: Vec<TagRecord>,
    pub readings: HashMap<String, Vec<Reading>>,
    /// Requests with more uuids than this fail.
    pub max_batch: Option<usize>,
    /// Uuids whose requests always fail.
    pub broken: Vec<String>,
    /// Every request fails with this HTTP status.
    pub status: Option<reqwest::StatusCode>,
    /// Size of every `data_uuid` request, in call order.
    pub calls: Mutex<Vec<usize>>,
}

impl MockArchive {
    pub fn with_readings(uuids: &[String], window: &TimeWindow) -> Self {
        let readings = uuids
            .iter()
            .enumerate()
            .map(|(i, uuid)| {
                let base = window.start_ms();
                let series = (0..3)
                    .map(|step| Reading::new(base + step * 300_000, i as f64 + step as f64))
                    .collect();
                (uuid.clone(), series)
            })
            .collect();
        Self {
            readings,
            ..Default::default()
        }
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl ArchiveClient for MockArchive {
    async fn tags(&self, _predicate: &str) -> Result<Vec<TagRecord>, ArchiveError> {
        Ok(self.tags.clone())
    }

    async fn data_uuid(
        &self,
        uuids: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<TimeSeries>, ArchiveError> {
        self.calls.lock().unwrap().push(uuids.len());

        if let Some(status) = self.status {
            return Err(ArchiveError::HttpStatus {
                url: "mock://archive/api/query".into(),
                status,
            });
        }
        if self.max_batch.is_some_and(|max| uuids.len() > max) {
            return Err(ArchiveError::Rejected(format!(
                "too many uuids ({})",
                uuids.len()
            )));
        }
        if let Some(bad) = uuids.iter().find(|u| self.broken.contains(u)) {
            return Err(ArchiveError::Rejected(format!("broken stream {bad}")));
        }

        Ok(uuids
            .iter()
            .map(|uuid| {
                let readings = self
                    .readings
                    .get(uuid)
                    .map(|r| {
                        r.iter()
                            .filter(|reading| window.contains_ms(reading.timestamp_ms))
                            .copied()
                            .collect()
                    })
                    .unwrap_or_default();
                TimeSeries::new(uuid.clone(), readings)
            })
            .collect())
    }
}
