//! Prescription data model
//!
//! Records are serialized with camelCase field names so they match the
//! documents held by the storage collaborator.

pub mod draft;

use serde::{Deserialize, Deserializer, Serialize};

use crate::encoding::code::PrescriptionCode;

/// Medication names offered when building a prescription. Names are stored
/// as free text; this list only drives data entry and the QR letter keys.
pub const MEDICATION_CATALOG: &[&str] =
    &["Aspirin", "Paracetamol", "Naproxen", "Metoprolol", "Dolo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age: u32,
    #[serde(
        default,
        deserialize_with = "deserialize_gender",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

impl Patient {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Patient {
            name: name.into(),
            age,
            gender: None,
            contact_number: None,
        }
    }

    /// Age as typed into a form. Leading whitespace is skipped and the
    /// leading run of digits is read, so "42 years" is 42 and "3.7" is 3.
    /// No digits, or a negative number, gives 0.
    pub fn age_from_input(input: &str) -> u32 {
        let trimmed = input.trim_start();
        let unsigned = match trimmed.strip_prefix('-') {
            Some(_) => return 0,
            None => trimmed.strip_prefix('+').unwrap_or(trimmed),
        };
        unsigned
            .chars()
            .map_while(|c| c.to_digit(10))
            .fold(0u32, |age, digit| age.saturating_mul(10).saturating_add(digit))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeInput {
    Whole(u64),
    Signed(i64),
    Fractional(f64),
    Text(String),
}

// Ages arrive as numbers from stored records and as raw text from forms.
fn deserialize_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match AgeInput::deserialize(deserializer)? {
        AgeInput::Whole(age) => u32::try_from(age).unwrap_or(u32::MAX),
        AgeInput::Signed(_) => 0,
        // `as` saturates and maps NaN to 0
        AgeInput::Fractional(age) if age > 0.0 => age.trunc() as u32,
        AgeInput::Fractional(_) => 0,
        AgeInput::Text(text) => Patient::age_from_input(&text),
    };
    Ok(age)
}

// Forms submit an unselected gender as an empty string.
fn deserialize_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "male" => Ok(Some(Gender::Male)),
            "female" => Ok(Some(Gender::Female)),
            "other" => Ok(Some(Gender::Other)),
            _ => Err(serde::de::Error::unknown_variant(
                value,
                &["male", "female", "other"],
            )),
        },
    }
}

/// One line of a prescription. `frequency` and `duration` are free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Medication {
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            duration: duration.into(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,            // Assigned by the store
    pub doctor_id: String,
    pub doctor_name: String,
    pub patient: Patient,
    pub medications: Vec<Medication>,  // Insertion order is display order
    pub date: String,                  // ISO 8601, set once at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub prescription_code: PrescriptionCode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_age_from_input() {
        assert_eq!(Patient::age_from_input("42"), 42);
        assert_eq!(Patient::age_from_input(" 7 "), 7);
        assert_eq!(Patient::age_from_input("forty"), 0);
        assert_eq!(Patient::age_from_input(""), 0);
        assert_eq!(Patient::age_from_input("-3"), 0);
        assert_eq!(Patient::age_from_input("3.7"), 3);
        assert_eq!(Patient::age_from_input("42 years"), 42);
        assert_eq!(Patient::age_from_input("+8"), 8);
        assert_eq!(Patient::age_from_input("99999999999"), u32::MAX);
    }

    #[test]
    fn test_age_accepts_form_text_and_numbers() {
        let ages: Vec<u32> = [r#""42 years""#, r#""3.7""#, r#""""#, "51", "12.9", "-4"]
            .iter()
            .map(|age| {
                let json = format!(r#"{{ "name": "Asha", "age": {} }}"#, age);
                serde_json::from_str::<Patient>(&json).unwrap().age
            })
            .collect();
        assert_eq!(ages, vec![42, 3, 0, 51, 12, 0]);

        let missing: Patient = serde_json::from_str(r#"{ "name": "Asha" }"#).unwrap();
        assert_eq!(missing.age, 0);
    }

    #[test]
    fn test_prescription_json_shape() {
        let json = r#"{
            "doctorId": "doc-1",
            "doctorName": "Dr. Rao",
            "patient": {
                "name": "Asha",
                "age": 34,
                "gender": "female",
                "contactNumber": "555-0100"
            },
            "medications": [
                { "name": "Aspirin", "dosage": "75mg", "frequency": "1", "duration": "30" }
            ],
            "date": "2025-01-05T15:45:00.000Z",
            "prescriptionCode": "V1StGXR8"
        }"#;

        let prescription: Prescription = serde_json::from_str(json).unwrap();
        assert_eq!(prescription.patient.gender, Some(Gender::Female));
        assert_eq!(prescription.patient.contact_number.as_deref(), Some("555-0100"));
        assert_eq!(prescription.medications[0].notes, None);
        assert_eq!(prescription.prescription_code.as_str(), "V1StGXR8");
        assert_eq!(prescription.id, None);

        let value = serde_json::to_value(&prescription).unwrap();
        assert_eq!(value["prescriptionCode"], "V1StGXR8");
        assert_eq!(value["patient"]["contactNumber"], "555-0100");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_blank_gender_is_unset() {
        let blank = r#"{ "name": "Ravi", "age": 5, "gender": "" }"#;
        let patient: Patient = serde_json::from_str(blank).unwrap();
        assert_eq!(patient.gender, None);

        let unknown = r#"{ "name": "Ravi", "age": 5, "gender": "robot" }"#;
        let result: Result<Patient, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_malformed_code() {
        let json = r#"{
            "doctorId": "doc-1",
            "doctorName": "Dr. Rao",
            "patient": { "name": "Asha", "age": 34 },
            "medications": [],
            "date": "2025-01-05T15:45:00.000Z",
            "prescriptionCode": "short"
        }"#;
        assert!(serde_json::from_str::<Prescription>(json).is_err());
    }
}
