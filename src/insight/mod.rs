//! On-demand AI logistics insight.
//!
//! The [`InsightRequester`] runs a single explicit call to the
//! summarization collaborator over the currently filtered record set. It
//! is independent of the sync loop: its failures never touch sync state,
//! and the sync loop never triggers it.

pub mod ollama;

use crate::analytics::{filter_records, EventFilter};
use crate::models::Participant;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Failure from the summarization collaborator.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarization request timed out after {0}s")]
    Timeout(u64),
    #[error("cannot connect to the model service at {0}")]
    Connect(String),
    #[error("model service error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed model response: {0}")]
    Malformed(String),
    #[error("summarization request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Why an insight request was refused or failed.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Raised synchronously; the collaborator is never contacted.
    #[error("no records available for analysis")]
    NoRecords,
    /// Another request is still in flight.
    #[error("an insight request is already running")]
    Busy,
    #[error(transparent)]
    Summarization(#[from] SummarizationError),
}

/// Collaborator that turns a record set into a narrative summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, records: &[Participant]) -> Result<String, SummarizationError>;
}

/// Orchestrates explicit, user-triggered insight requests.
pub struct InsightRequester {
    summarizer: Arc<dyn Summarizer>,
    busy: AtomicBool,
    insight: Mutex<Option<String>>,
}

/// Clears the busy flag on every exit path of `request`.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InsightRequester {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            summarizer,
            busy: AtomicBool::new(false),
            insight: Mutex::new(None),
        }
    }

    /// Whether a request is currently in flight. Callers are expected to
    /// disable their trigger while this is set.
    #[allow(dead_code)] // Interactive dashboard surface
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Request a narrative summary over the filtered record set.
    ///
    /// Refuses before contacting the collaborator when `records` is empty
    /// or when another request is in flight. On success the narrative is
    /// stored as the active insight and also returned.
    pub async fn request(
        &self,
        records: &[Participant],
        filter: &EventFilter,
    ) -> Result<String, InsightError> {
        if records.is_empty() {
            return Err(InsightError::NoRecords);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(InsightError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let in_scope: Vec<Participant> = filter_records(records, filter)
            .into_iter()
            .cloned()
            .collect();

        let narrative = self.summarizer.summarize(&in_scope).await?;

        *self.insight.lock().expect("insight lock poisoned") = Some(narrative.clone());
        Ok(narrative)
    }

    /// The active insight, if one has been generated and not dismissed.
    #[allow(dead_code)] // Interactive dashboard surface
    pub fn current(&self) -> Option<String> {
        self.insight.lock().expect("insight lock poisoned").clone()
    }

    /// Dismiss the active insight. No history is retained.
    #[allow(dead_code)] // Interactive dashboard surface
    pub fn dismiss(&self) {
        *self.insight.lock().expect("insight lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccommodationSelection, Sex};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn record(event: &str) -> Participant {
        Participant::new(
            event.to_string(),
            "Bulan".to_string(),
            "Test".to_string(),
            Sex::Female,
            "Staff".to_string(),
            "test@example.com".to_string(),
            true,
            AccommodationSelection {
                day1: true,
                ..AccommodationSelection::default()
            },
        )
    }

    struct MockSummarizer {
        calls: AtomicUsize,
        seen: Mutex<Vec<usize>>,
        result: Mutex<Option<Result<String, SummarizationError>>>,
    }

    impl MockSummarizer {
        fn returning(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                result: Mutex::new(Some(Ok(text.to_string()))),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                result: Mutex::new(Some(Err(SummarizationError::Timeout(120)))),
            }
        }
    }

    #[async_trait]
    impl Summarizer for MockSummarizer {
        async fn summarize(
            &self,
            records: &[Participant],
        ) -> Result<String, SummarizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(records.len());
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok("insight".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_records_refused_without_collaborator_contact() {
        let summarizer = Arc::new(MockSummarizer::returning("unused"));
        let requester = InsightRequester::new(summarizer.clone());

        let result = requester.request(&[], &EventFilter::All).await;
        assert!(matches!(result, Err(InsightError::NoRecords)));
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
        assert!(requester.current().is_none());
        assert!(!requester.is_busy());
    }

    #[tokio::test]
    async fn test_success_stores_active_insight() {
        let summarizer = Arc::new(MockSummarizer::returning("Lodging demand peaks on day 2."));
        let requester = InsightRequester::new(summarizer);

        let records = vec![record("Summit")];
        let narrative = requester.request(&records, &EventFilter::All).await.unwrap();
        assert_eq!(narrative, "Lodging demand peaks on day 2.");
        assert_eq!(requester.current().as_deref(), Some("Lodging demand peaks on day 2."));

        requester.dismiss();
        assert!(requester.current().is_none());
    }

    #[tokio::test]
    async fn test_filter_applied_before_summarization() {
        let summarizer = Arc::new(MockSummarizer::returning("ok"));
        let requester = InsightRequester::new(summarizer.clone());

        let records = vec![record("Summit"), record("Summit"), record("Training")];
        let filter = EventFilter::Event("Summit".to_string());
        requester.request(&records, &filter).await.unwrap();

        assert_eq!(summarizer.seen.lock().unwrap().as_slice(), &[2]);
    }

    #[tokio::test]
    async fn test_failure_clears_busy_and_keeps_no_insight() {
        let summarizer = Arc::new(MockSummarizer::failing());
        let requester = InsightRequester::new(summarizer);

        let records = vec![record("Summit")];
        let result = requester.request(&records, &EventFilter::All).await;
        assert!(matches!(result, Err(InsightError::Summarization(_))));
        assert!(requester.current().is_none());
        assert!(!requester.is_busy());
    }

    struct GatedSummarizer {
        gate: Notify,
    }

    #[async_trait]
    impl Summarizer for GatedSummarizer {
        async fn summarize(
            &self,
            _records: &[Participant],
        ) -> Result<String, SummarizationError> {
            self.gate.notified().await;
            Ok("slow insight".to_string())
        }
    }

    #[tokio::test]
    async fn test_second_request_refused_while_busy() {
        let summarizer = Arc::new(GatedSummarizer {
            gate: Notify::new(),
        });
        let requester = InsightRequester::new(summarizer.clone());
        let records = vec![record("Summit")];

        let second = async {
            tokio::task::yield_now().await;
            assert!(requester.is_busy());
            let result = requester.request(&records, &EventFilter::All).await;
            assert!(matches!(result, Err(InsightError::Busy)));
            summarizer.gate.notify_one();
        };

        let (first, ()) = tokio::join!(requester.request(&records, &EventFilter::All), second);
        assert_eq!(first.unwrap(), "slow insight");
        assert!(!requester.is_busy());
    }
}
