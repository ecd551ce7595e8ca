//! Dashboard rendering.
//!
//! Turns an analytics summary into the terminal dashboard text or a
//! machine-readable JSON document.

use crate::analytics::EventFilter;
use crate::models::AnalyticsSummary;
use crate::sync::SyncStatus;
use anyhow::Result;
use std::collections::BTreeMap;

/// Render the text dashboard.
///
/// Breakdown sections are sorted by key so repeated renders of the same
/// data are identical.
pub fn render_text(summary: &AnalyticsSummary, status: SyncStatus, filter: &EventFilter) -> String {
    let mut output = String::new();

    output.push_str("=== CBMS Events Dashboard ===\n");
    output.push_str(&format!("Sync: {} | Event filter: {}\n\n", status, filter));

    output.push_str(&format!(
        "Participants: {}\nRoom-nights:  {}\n",
        summary.total_participants, summary.total_room_nights
    ));

    output.push_str(&render_breakdown("By municipality", &summary.municipality_stats));
    output.push_str(&render_breakdown("By gender", &summary.gender_stats));
    output.push_str(&render_breakdown("By event", &summary.event_stats));

    output
}

fn render_breakdown(title: &str, stats: &std::collections::HashMap<String, usize>) -> String {
    if stats.is_empty() {
        return String::new();
    }

    let mut section = format!("\n{}:\n", title);
    let sorted: BTreeMap<_, _> = stats.iter().collect();
    for (key, count) in sorted {
        section.push_str(&format!("  {:<20} {}\n", key, count));
    }

    section
}

/// Render the summary as pretty-printed JSON.
pub fn render_json(summary: &AnalyticsSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::summarize;
    use crate::models::{AccommodationSelection, Participant, Sex};

    fn sample_summary() -> AnalyticsSummary {
        let records = vec![
            Participant::new(
                "Summit".to_string(),
                "Bulan".to_string(),
                "A".to_string(),
                Sex::Male,
                "Staff".to_string(),
                "a@example.com".to_string(),
                true,
                AccommodationSelection {
                    day1: true,
                    day3: true,
                    ..AccommodationSelection::default()
                },
            ),
            Participant::new(
                "Summit".to_string(),
                "Gubat".to_string(),
                "B".to_string(),
                Sex::Female,
                "Staff".to_string(),
                "b@example.com".to_string(),
                false,
                AccommodationSelection::default(),
            ),
        ];
        summarize(&records, &EventFilter::All)
    }

    #[test]
    fn test_text_dashboard_contains_all_sections() {
        let text = render_text(&sample_summary(), SyncStatus::Idle, &EventFilter::All);

        assert!(text.contains("Sync: idle | Event filter: all"));
        assert!(text.contains("Participants: 2"));
        assert!(text.contains("Room-nights:  2"));
        assert!(text.contains("By municipality:"));
        assert!(text.contains("Bulan"));
        assert!(text.contains("By gender:"));
        assert!(text.contains("By event:"));
    }

    #[test]
    fn test_text_dashboard_empty_summary_omits_breakdowns() {
        let text = render_text(
            &AnalyticsSummary::default(),
            SyncStatus::Error,
            &EventFilter::Event("Summit".to_string()),
        );

        assert!(text.contains("Sync: error | Event filter: Summit"));
        assert!(text.contains("Participants: 0"));
        assert!(!text.contains("By municipality:"));
    }

    #[test]
    fn test_json_output_uses_wire_field_names() {
        let json = render_json(&sample_summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["totalParticipants"], 2);
        assert_eq!(value["totalRoomNights"], 2);
        assert_eq!(value["municipalityStats"]["Bulan"], 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let summary = sample_summary();
        let first = render_text(&summary, SyncStatus::Idle, &EventFilter::All);
        let second = render_text(&summary, SyncStatus::Idle, &EventFilter::All);
        assert_eq!(first, second);
    }
}
