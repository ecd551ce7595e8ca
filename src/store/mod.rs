//! Record store clients.
//!
//! The authoritative record store is the provincial spreadsheet, reached
//! through its web-app endpoint. Everything above this module talks to the
//! [`RecordStore`] trait so the in-memory store can stand in for demos and
//! tests.

pub mod memory;
pub mod sheets;

use crate::models::Participant;
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the record store.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("store request timed out")]
    Timeout,
    #[error("cannot reach record store at {0}")]
    Connect(String),
    #[error("store returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed store response: {0}")]
    Malformed(String),
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Client for the participant record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every registration record, in store order.
    async fn fetch_all(&self) -> Result<Vec<Participant>, FetchError>;

    /// Persist one new registration record.
    ///
    /// Implementations publish `records_updated` on their bus (when one is
    /// attached) after a successful append.
    async fn append(&self, record: &Participant) -> Result<(), FetchError>;
}
