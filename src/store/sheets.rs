//! Spreadsheet-backed record store.
//!
//! Talks to the Google Apps Script web app that fronts the provincial
//! registration spreadsheet. Fetch is a GET returning the JSON participant
//! array; append is a POST of a single record.

use crate::models::Participant;
use crate::store::{FetchError, RecordStore};
use crate::sync::bus::UpdateBus;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Record store client for the spreadsheet web-app endpoint.
pub struct SheetsStore {
    client: reqwest::Client,
    endpoint: String,
    bus: Option<UpdateBus>,
}

impl SheetsStore {
    /// Create a client against the given endpoint with a request timeout.
    pub fn new(endpoint: String, timeout_seconds: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            bus: None,
        })
    }

    /// Attach the bus on which successful appends are announced.
    pub fn with_bus(mut self, bus: UpdateBus) -> Self {
        self.bus = Some(bus);
        self
    }

    fn map_send_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(self.endpoint.clone())
        } else {
            FetchError::Request(e)
        }
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn fetch_all(&self) -> Result<Vec<Participant>, FetchError> {
        debug!("Fetching records from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", "fetch")])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let records: Vec<Participant> = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        debug!("Fetched {} records", records.len());
        Ok(records)
    }

    async fn append(&self, record: &Participant) -> Result<(), FetchError> {
        info!("Appending record {} to {}", record.id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("action", "append")])
            .json(record)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        if let Some(bus) = &self.bus {
            bus.notify_records_updated();
        }

        Ok(())
    }
}
