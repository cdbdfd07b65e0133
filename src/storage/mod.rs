//! Prescription storage
//!
//! The document database is an external collaborator; `PrescriptionStore`
//! is the seam it plugs into. `MemoryStore` backs the bundled server and
//! the tests.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use thiserror::Error;

use crate::prescription::Prescription;

/// Number of prescriptions shown on a doctor's dashboard.
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("A prescription with code {0} already exists")]
    DuplicateCode(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub trait PrescriptionStore: Send + Sync {
    /// Stores a new record and returns it with its storage id set.
    fn insert(&self, prescription: Prescription) -> Result<Prescription, StoreError>;

    fn find_by_code(&self, code: &str) -> Result<Option<Prescription>, StoreError>;

    /// Newest first.
    fn recent_for_doctor(
        &self,
        doctor_id: &str,
        limit: usize,
    ) -> Result<Vec<Prescription>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    // Keyed by prescription code
    records: RwLock<HashMap<String, Prescription>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl PrescriptionStore for MemoryStore {
    fn insert(&self, mut prescription: Prescription) -> Result<Prescription, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let code = prescription.prescription_code.as_str().to_string();

        if records.contains_key(&code) {
            return Err(StoreError::DuplicateCode(code));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        prescription.id = Some(format!("rx-{:06}", id));
        records.insert(code, prescription.clone());
        Ok(prescription)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Prescription>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(code).cloned())
    }

    fn recent_for_doctor(
        &self,
        doctor_id: &str,
        limit: usize,
    ) -> Result<Vec<Prescription>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut matching: Vec<&Prescription> = records
            .values()
            .filter(|p| p.doctor_id == doctor_id)
            .collect();

        // ISO 8601 dates in UTC order lexically; the code breaks ties
        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.prescription_code.cmp(&b.prescription_code))
        });

        Ok(matching.into_iter().take(limit).cloned().collect())
    }
}

/// What a doctor sees after signing in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub recent_prescriptions: Vec<Prescription>,
    /// Distinct patient names among the recent prescriptions.
    pub patient_count: usize,
}

pub fn dashboard_summary(
    store: &dyn PrescriptionStore,
    doctor_id: &str,
) -> Result<DashboardSummary, StoreError> {
    let recent = store.recent_for_doctor(doctor_id, DASHBOARD_RECENT_LIMIT)?;
    let patient_count = recent
        .iter()
        .map(|p| p.patient.name.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(DashboardSummary {
        recent_prescriptions: recent,
        patient_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescription::{Medication, Patient};
    use pretty_assertions::assert_eq;

    fn record(code: &str, doctor: &str, patient: &str, date: &str) -> Prescription {
        Prescription {
            id: None,
            doctor_id: doctor.to_string(),
            doctor_name: "Dr. Rao".to_string(),
            patient: Patient::new(patient, 40),
            medications: vec![Medication::new("Aspirin", "75mg", "1", "30")],
            date: date.to_string(),
            notes: None,
            prescription_code: code.parse().unwrap(),
        }
    }

    #[test]
    fn test_basic_operations() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());

        let stored = store
            .insert(record("V1StGXR8", "doc-1", "Asha", "2025-01-05T15:45:00.000Z"))
            .unwrap();
        assert_eq!(stored.id.as_deref(), Some("rx-000001"));

        let found = store.find_by_code("V1StGXR8").unwrap();
        assert_eq!(found, Some(stored));
        assert_eq!(store.find_by_code("Uakgb_J5").unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let store = MemoryStore::new();
        store.insert(record("V1StGXR8", "doc-1", "Asha", "2025-01-05T15:45:00.000Z")).unwrap();

        let again = store.insert(record("V1StGXR8", "doc-2", "Ravi", "2025-01-06T10:00:00.000Z"));
        assert_eq!(again, Err(StoreError::DuplicateCode("V1StGXR8".to_string())));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_recent_for_doctor_orders_newest_first() {
        let store = MemoryStore::new();
        store.insert(record("aaaaaaa1", "doc-1", "Asha", "2025-01-01T08:00:00.000Z")).unwrap();
        store.insert(record("aaaaaaa2", "doc-1", "Ravi", "2025-01-03T08:00:00.000Z")).unwrap();
        store.insert(record("aaaaaaa3", "doc-2", "Mei", "2025-01-04T08:00:00.000Z")).unwrap();
        store.insert(record("aaaaaaa4", "doc-1", "Asha", "2025-01-02T08:00:00.000Z")).unwrap();

        let recent = store.recent_for_doctor("doc-1", 2).unwrap();
        let codes: Vec<&str> = recent
            .iter()
            .map(|p| p.prescription_code.as_str())
            .collect();
        assert_eq!(codes, vec!["aaaaaaa2", "aaaaaaa4"]);
    }

    #[test]
    fn test_dashboard_summary() {
        let store = MemoryStore::new();
        let patients = ["Asha", "Ravi", "Asha", "Mei", "Ravi", "Old"];
        for (i, patient) in patients.iter().enumerate() {
            let code = format!("dashbrd{}", i);
            let date = format!("2025-02-0{}T09:00:00.000Z", 9 - i);
            store.insert(record(&code, "doc-1", patient, &date)).unwrap();
        }

        let summary = dashboard_summary(&store, "doc-1").unwrap();
        assert_eq!(summary.recent_prescriptions.len(), DASHBOARD_RECENT_LIMIT);
        // "Old" is the sixth prescription, outside the recent window
        assert_eq!(summary.patient_count, 3);

        let empty = dashboard_summary(&store, "doc-9").unwrap();
        assert_eq!(empty.patient_count, 0);
        assert!(empty.recent_prescriptions.is_empty());
    }
}
