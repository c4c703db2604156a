//! Client for the sMAP archiver query API.

use crate::archive::error::ArchiveError;
use crate::types::time_series::{Reading, TimeSeries, TimeWindow};
use bon::bon;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One stream's tags as returned by a `select *` query. Only the uuid and path
/// are kept; the source filter is applied by the query itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub uuid: String,
    #[serde(rename = "Path", default)]
    pub path: Option<String>,
}

/// Readings block of a `select data` response.
#[derive(Debug, Deserialize)]
struct DataRecord {
    uuid: String,
    #[serde(rename = "Readings", default)]
    readings: Vec<(f64, Option<f64>)>,
}

/// Access to a time-series archive: tag lookup and bulk reading download.
///
/// Implementations must return exactly one series per requested uuid, in request order.
#[allow(async_fn_in_trait)]
pub trait ArchiveClient {
    /// Returns the tags of every stream matching `predicate`
    /// (e.g. `Metadata/SourceName = 'Field Study 4'`).
    async fn tags(&self, predicate: &str) -> Result<Vec<TagRecord>, ArchiveError>;

    /// Returns the readings of each uuid inside `window`.
    async fn data_uuid(
        &self,
        uuids: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<TimeSeries>, ArchiveError>;
}

/// HTTP client for an sMAP archiver, authenticated with a pre-shared key.
pub struct SmapClient {
    base_url: String,
    key: Option<String>,
    http: Client,
}

#[bon]
impl SmapClient {
    /// Creates a client for the archiver at `base_url` (e.g. `http://host:8079`).
    ///
    /// # Examples
    ///
    /// ```
    /// # use hot_water_reset::{SmapClient, ArchiveError};
    /// # use std::time::Duration;
    /// # fn run() -> Result<(), ArchiveError> {
    /// let client = SmapClient::builder()
    ///     .base_url("http://localhost:8079")
    ///     .key("secret")
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] base_url: String,
        #[builder(into)] key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ArchiveError> {
        let mut http = Client::builder();
        if let Some(timeout) = timeout {
            http = http.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            http: http.build().map_err(ArchiveError::ClientBuild)?,
        })
    }
}

impl SmapClient {
    async fn query<T: DeserializeOwned>(&self, body: String) -> Result<T, ArchiveError> {
        let url = format!("{}/api/query", self.base_url);
        debug!("POST {} <- {}", url, body);

        let mut request = self.http.post(&url).body(body);
        if let Some(key) = &self.key {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ArchiveError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ArchiveError::HttpStatus { url, status }
                } else {
                    ArchiveError::NetworkRequest(url, e)
                });
            }
        };

        response
            .json::<T>()
            .await
            .map_err(|e| ArchiveError::Decode(url, e))
    }
}

impl ArchiveClient for SmapClient {
    async fn tags(&self, predicate: &str) -> Result<Vec<TagRecord>, ArchiveError> {
        self.query(tags_query(predicate)).await
    }

    async fn data_uuid(
        &self,
        uuids: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<TimeSeries>, ArchiveError> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<DataRecord> = self.query(data_query(uuids, window)?).await?;
        Ok(align_to_request(uuids, records))
    }
}

pub(crate) fn tags_query(predicate: &str) -> String {
    format!("select * where {predicate}")
}

/// `select data in (start_ms, end_ms) limit -1 where uuid = 'a' or uuid = 'b'`
pub(crate) fn data_query(uuids: &[String], window: &TimeWindow) -> Result<String, ArchiveError> {
    if let Some(bad) = uuids.iter().find(|u| u.contains(['\'', '"', '\\'])) {
        return Err(ArchiveError::Rejected(format!(
            "uuid {bad:?} contains quote characters"
        )));
    }
    let predicate = uuids
        .iter()
        .map(|uuid| format!("uuid = '{uuid}'"))
        .collect::<Vec<_>>()
        .join(" or ");
    Ok(format!(
        "select data in ({}, {}) limit -1 where {}",
        window.start_ms(),
        window.end_ms(),
        predicate
    ))
}

/// Orders the archive's answer to match the request. A uuid the archive did not
/// answer for gets an empty series.
fn align_to_request(uuids: &[String], records: Vec<DataRecord>) -> Vec<TimeSeries> {
    let mut by_uuid: HashMap<String, Vec<Reading>> = HashMap::with_capacity(records.len());
    for record in records {
        let readings = record
            .readings
            .into_iter()
            .filter_map(|(ts, value)| value.map(|v| Reading::new(ts.round() as i64, v)))
            .collect();
        by_uuid.entry(record.uuid).or_insert(readings);
    }

    uuids
        .iter()
        .map(|uuid| match by_uuid.get(uuid) {
            Some(readings) => TimeSeries::new(uuid.clone(), readings.clone()),
            None => {
                warn!("Archive returned no readings for uuid {}", uuid);
                TimeSeries::empty(uuid.clone())
            }
        })
        .collect()
}
