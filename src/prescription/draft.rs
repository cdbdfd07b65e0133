use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Medication, Patient, Prescription};
use crate::encoding::code::PrescriptionCode;

const DEFAULT_DOCTOR_NAME: &str = "Doctor";

#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error("Doctor id is required")]
    MissingDoctor,

    #[error("Patient name is required")]
    MissingPatientName,

    #[error("At least one medication is required")]
    NoMedications,

    #[error("Medication {index} ({name}) is missing {field}")]
    MissingField {
        index: usize,
        name: String,
        field: &'static str,
    },
}

/// A prescription as submitted by a doctor, before it has a code or a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    pub doctor_id: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    pub patient: Patient,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PrescriptionDraft {
    /// Medication rows left with an empty name are dropped, then the
    /// remaining required fields are checked.
    pub fn into_prescription(
        self,
        code: PrescriptionCode,
        now: DateTime<Utc>,
    ) -> Result<Prescription, DraftError> {
        if self.doctor_id.trim().is_empty() {
            return Err(DraftError::MissingDoctor);
        }
        if self.patient.name.trim().is_empty() {
            return Err(DraftError::MissingPatientName);
        }

        let medications: Vec<Medication> = self
            .medications
            .into_iter()
            .filter(|med| !med.name.is_empty())
            .collect();
        if medications.is_empty() {
            return Err(DraftError::NoMedications);
        }

        for (index, med) in medications.iter().enumerate() {
            let required = [
                ("dosage", &med.dosage),
                ("frequency", &med.frequency),
                ("duration", &med.duration),
            ];
            let missing = required.iter().find(|(_, value)| value.trim().is_empty());
            if let Some((field, _)) = missing {
                return Err(DraftError::MissingField {
                    index,
                    name: med.name.clone(),
                    field: *field,
                });
            }
        }

        let doctor_name = self
            .doctor_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOCTOR_NAME.to_string());

        Ok(Prescription {
            id: None,
            doctor_id: self.doctor_id,
            doctor_name,
            patient: self.patient,
            medications,
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            notes: self.notes.filter(|notes| !notes.is_empty()),
            prescription_code: code,
        })
    }
}
