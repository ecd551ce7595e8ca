//! Participant aggregation and statistics.
//!
//! Everything here is a pure function of its input: no hidden state, no
//! side effects, safe to call repeatedly and concurrently.

use crate::models::{AnalyticsSummary, Participant};
use std::fmt;
use std::str::FromStr;

/// Restricts which records contribute to aggregation and insight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventFilter {
    /// No restriction; every record is in scope.
    #[default]
    All,
    /// Only records registered under this event name.
    Event(String),
}

impl EventFilter {
    /// Whether the record falls inside this filter.
    pub fn matches(&self, participant: &Participant) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Event(name) => participant.event_name == *name,
        }
    }
}

impl FromStr for EventFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(EventFilter::All)
        } else {
            Ok(EventFilter::Event(s.to_string()))
        }
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFilter::All => write!(f, "all"),
            EventFilter::Event(name) => write!(f, "{}", name),
        }
    }
}

/// Select the records in scope for the given filter.
///
/// Both the aggregator and the insight requester go through this function
/// so all consumers see the identical subset.
pub fn filter_records<'a>(
    records: &'a [Participant],
    filter: &EventFilter,
) -> Vec<&'a Participant> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Aggregate the in-scope records into an [`AnalyticsSummary`].
///
/// An empty input yields zero counts and empty stat maps. Room-nights use
/// [`Participant::room_nights`], so records that did not avail
/// accommodation contribute nothing regardless of their stored day flags.
pub fn summarize(records: &[Participant], filter: &EventFilter) -> AnalyticsSummary {
    let in_scope = filter_records(records, filter);

    let mut summary = AnalyticsSummary {
        total_participants: in_scope.len(),
        ..AnalyticsSummary::default()
    };

    for record in in_scope {
        summary.total_room_nights += record.room_nights();

        *summary
            .municipality_stats
            .entry(record.municipality.clone())
            .or_insert(0) += 1;
        *summary
            .gender_stats
            .entry(record.sex.to_string())
            .or_insert(0) += 1;
        *summary
            .event_stats
            .entry(record.event_name.clone())
            .or_insert(0) += 1;
    }

    summary
}
