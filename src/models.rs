//! Data models for the event registration system.
//!
//! This module contains the core data structures shared across the
//! application: participant records as stored in the spreadsheet, and
//! the derived analytics summary.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The municipalities of Sorsogon province.
///
/// Fixed configuration data; registration forms only offer these values.
#[allow(dead_code)] // Form configuration data
pub const SORSOGON_MUNICIPALITIES: [&str; 16] = [
    "Barcelona",
    "Bulan",
    "Bulusan",
    "Casiguran",
    "Castilla",
    "Donsol",
    "Gubat",
    "Irosin",
    "Juban",
    "Magallanes",
    "Matnog",
    "Pilar",
    "Prieto Diaz",
    "Santa Magdalena",
    "Sorsogon City",
    "Sorsogon Province",
];

/// Sex of a participant, as captured by the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
            Sex::Other => write!(f, "Other"),
        }
    }
}

/// Per-day accommodation selection over the five event days.
///
/// Field names follow the spreadsheet wire format written by the
/// registration form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccommodationSelection {
    pub day1: bool,
    pub day2: bool,
    pub day3: bool,
    pub day4: bool,
    pub day5: bool,
}

impl AccommodationSelection {
    /// Number of days selected.
    pub fn nights(&self) -> usize {
        [self.day1, self.day2, self.day3, self.day4, self.day5]
            .iter()
            .filter(|&&d| d)
            .count()
    }
}

/// One registration record.
///
/// Records are created by the registration form, persisted by the record
/// store, and read-only from this program's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: String,
    /// Name of the event this registration belongs to.
    pub event_name: String,
    /// One of [`SORSOGON_MUNICIPALITIES`].
    pub municipality: String,
    /// Full name of the participant.
    pub name: String,
    pub sex: Sex,
    /// Designation or title.
    pub designation: String,
    pub email: String,
    /// Whether the participant requested accommodation at all.
    pub avail_accommodation: bool,
    pub accommodation_selection: AccommodationSelection,
    /// Creation time, epoch milliseconds, set once.
    pub timestamp: i64,
}

impl Participant {
    /// Create a new record with a fresh id and the current timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_name: String,
        municipality: String,
        name: String,
        sex: Sex,
        designation: String,
        email: String,
        avail_accommodation: bool,
        accommodation_selection: AccommodationSelection,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_name,
            municipality,
            name,
            sex,
            designation,
            email,
            avail_accommodation,
            accommodation_selection,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Room-nights claimed by this record.
    ///
    /// Day flags are only meaningful when `avail_accommodation` is set;
    /// stored flags are normalized away here rather than trusted.
    pub fn room_nights(&self) -> usize {
        if self.avail_accommodation {
            self.accommodation_selection.nights()
        } else {
            0
        }
    }

    /// Creation time as a UTC datetime.
    #[allow(dead_code)] // Utility accessor
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Aggregate statistics over a set of registration records.
///
/// Derived data, recomputed on every aggregation call, never persisted.
/// The three stat maps only contain keys whose count is greater than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_participants: usize,
    pub total_room_nights: usize,
    pub municipality_stats: HashMap<String, usize>,
    pub gender_stats: HashMap<String, usize>,
    pub event_stats: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nights_counts_selected_days() {
        let selection = AccommodationSelection {
            day1: true,
            day2: false,
            day3: true,
            day4: false,
            day5: true,
        };
        assert_eq!(selection.nights(), 3);
        assert_eq!(AccommodationSelection::default().nights(), 0);
    }

    #[test]
    fn test_room_nights_normalized_when_not_availing() {
        let mut participant = Participant::new(
            "Summit".to_string(),
            "Bulan".to_string(),
            "Test".to_string(),
            Sex::Male,
            "Staff".to_string(),
            "test@example.com".to_string(),
            false,
            AccommodationSelection {
                day1: true,
                day2: true,
                day3: true,
                day4: true,
                day5: true,
            },
        );
        assert_eq!(participant.room_nights(), 0);

        participant.avail_accommodation = true;
        assert_eq!(participant.room_nights(), 5);
    }

    #[test]
    fn test_participant_wire_format() {
        let json = r#"{
            "id": "abc-123",
            "eventName": "Summit",
            "municipality": "Bulan",
            "name": "Juan dela Cruz",
            "sex": "Male",
            "designation": "MPDC",
            "email": "juan@example.com",
            "availAccommodation": true,
            "accommodationSelection": {
                "day1": true, "day2": false, "day3": false,
                "day4": false, "day5": false
            },
            "timestamp": 1700000000000
        }"#;

        let participant: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(participant.event_name, "Summit");
        assert_eq!(participant.sex, Sex::Male);
        assert_eq!(participant.room_nights(), 1);
        assert!(participant.created_at().is_some());

        let back = serde_json::to_value(&participant).unwrap();
        assert_eq!(back["eventName"], "Summit");
        assert_eq!(back["availAccommodation"], true);
        assert_eq!(back["sex"], "Male");
    }

    #[test]
    fn test_municipality_list_is_complete() {
        assert_eq!(SORSOGON_MUNICIPALITIES.len(), 16);
        assert!(SORSOGON_MUNICIPALITIES.contains(&"Bulan"));
        assert!(SORSOGON_MUNICIPALITIES.contains(&"Sorsogon City"));
    }
}
