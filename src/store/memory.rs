//! In-memory record store.
//!
//! Stands in for the spreadsheet in `--demo` mode and in tests.

use crate::models::{AccommodationSelection, Participant, Sex};
use crate::store::{FetchError, RecordStore};
use crate::sync::bus::UpdateBus;
use async_trait::async_trait;
use std::sync::Mutex;

/// Record store holding everything in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Participant>>,
    bus: Option<UpdateBus>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial record set.
    pub fn with_records(records: Vec<Participant>) -> Self {
        Self {
            records: Mutex::new(records),
            bus: None,
        }
    }

    /// Attach the bus on which successful appends are announced.
    pub fn with_bus(mut self, bus: UpdateBus) -> Self {
        self.bus = Some(bus);
        self
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Participant>, FetchError> {
        Ok(self.records.lock().expect("store lock poisoned").clone())
    }

    async fn append(&self, record: &Participant) -> Result<(), FetchError> {
        self.records
            .lock()
            .expect("store lock poisoned")
            .push(record.clone());

        if let Some(bus) = &self.bus {
            bus.notify_records_updated();
        }

        Ok(())
    }
}

/// Demo registrations covering a spread of municipalities and events.
pub fn sample_records() -> Vec<Participant> {
    let entries: [(&str, &str, &str, Sex, &str, bool, [bool; 5]); 6] = [
        (
            "Provincial CBMS Summit",
            "Bulan",
            "Maria Santos",
            Sex::Female,
            "MPDC",
            true,
            [true, true, false, false, false],
        ),
        (
            "Provincial CBMS Summit",
            "Gubat",
            "Jose Ramirez",
            Sex::Male,
            "Municipal Statistician",
            true,
            [true, true, true, false, false],
        ),
        (
            "Provincial CBMS Summit",
            "Sorsogon City",
            "Ana Villanueva",
            Sex::Female,
            "IT Officer",
            false,
            [false; 5],
        ),
        (
            "Data Capture Training",
            "Irosin",
            "Pedro Fuentes",
            Sex::Male,
            "Enumerator",
            true,
            [false, true, true, true, false],
        ),
        (
            "Data Capture Training",
            "Matnog",
            "Clara Diaz",
            Sex::Female,
            "Enumerator",
            false,
            [false; 5],
        ),
        (
            "Data Capture Training",
            "Donsol",
            "Ramon Gatdula",
            Sex::Other,
            "Field Coordinator",
            true,
            [true, false, false, false, true],
        ),
    ];

    entries
        .into_iter()
        .map(|(event, municipality, name, sex, designation, avail, days)| {
            Participant::new(
                event.to_string(),
                municipality.to_string(),
                name.to_string(),
                sex,
                designation.to_string(),
                format!(
                    "{}@sorsogon.gov.ph",
                    name.to_lowercase().replace(' ', ".")
                ),
                avail,
                AccommodationSelection {
                    day1: days[0],
                    day2: days[1],
                    day3: days[2],
                    day4: days[3],
                    day5: days[4],
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{summarize, EventFilter};

    #[tokio::test]
    async fn test_fetch_returns_seeded_records() {
        let store = InMemoryStore::with_records(sample_records());
        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 6);
    }

    #[tokio::test]
    async fn test_append_notifies_bus() {
        let bus = UpdateBus::new();
        let mut rx = bus.subscribe();
        let store = InMemoryStore::new().with_bus(bus.clone());

        let record = sample_records().remove(0);
        store.append(&record).await.unwrap();

        assert!(rx.recv().await.is_ok());
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
    }

    #[test]
    fn test_sample_records_have_accommodation_demand() {
        let summary = summarize(&sample_records(), &EventFilter::All);
        assert_eq!(summary.total_participants, 6);
        assert!(summary.total_room_nights > 0);
        assert_eq!(summary.event_stats.len(), 2);
    }
}
