//! QR payload encoding
//!
//! The payload is a short, non-reversible summary of a prescription's
//! medications: for every configured letter key, the summed
//! `frequency * duration` of the medications whose name starts with that
//! letter. Example for a single "Aspirin", frequency "3", duration "5":
//!
//! ```text
//! A:15,P:0,N:0,M:0,D:0
//! ```
//!
//! Letters outside the configured set are dropped from the output.
//! Non-numeric magnitudes count as zero.

use std::collections::BTreeMap;

use crate::encoding::code::PrescriptionCode;
use crate::prescription::{Medication, Prescription, MEDICATION_CATALOG};

pub const DEFAULT_SCAN_BASE_URL: &str = "http://localhost:3000";

/// Ordered set of upper-case letters emitted in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterKeys(Vec<char>);

impl LetterKeys {
    /// Upper-cases the letters and drops repeats, keeping first occurrence order.
    pub fn new(letters: impl IntoIterator<Item = char>) -> Self {
        let mut keys = Vec::new();
        for letter in letters {
            let key = letter_key(letter);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        LetterKeys(keys)
    }

    pub fn from_catalog(catalog: &[&str]) -> Self {
        LetterKeys::new(catalog.iter().filter_map(|name| name.chars().next()))
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl Default for LetterKeys {
    fn default() -> Self {
        LetterKeys::from_catalog(MEDICATION_CATALOG)
    }
}

fn letter_key(letter: char) -> char {
    letter.to_uppercase().next().unwrap_or(letter)
}

/// Reads a free-text field as a number. Blank, non-numeric and
/// non-finite values yield `None`.
fn magnitude(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// `frequency * duration`, or 0 when either side is not a number or the
/// product overflows.
pub fn medication_weight(medication: &Medication) -> f64 {
    match (magnitude(&medication.frequency), magnitude(&medication.duration)) {
        (Some(frequency), Some(duration)) => finite_or_zero(frequency * duration),
        _ => 0.0,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Summed weight per leading letter, over every medication with a name.
pub fn letter_weights(medications: &[Medication]) -> BTreeMap<char, f64> {
    let mut weights = BTreeMap::new();
    for medication in medications {
        if let Some(first) = medication.name.chars().next() {
            *weights.entry(letter_key(first)).or_insert(0.0) += medication_weight(medication);
        }
    }
    weights
}

pub fn encode_qr_payload(prescription: &Prescription, keys: &LetterKeys) -> String {
    encode_medications(&prescription.medications, keys)
}

pub fn encode_medications(medications: &[Medication], keys: &LetterKeys) -> String {
    let weights = letter_weights(medications);
    keys.iter()
        .map(|letter| {
            // Sums of large weights can still overflow
            let weight = finite_or_zero(weights.get(&letter).copied().unwrap_or(0.0));
            // Adding 0.0 turns -0.0 into 0.0
            format!("{}:{}", letter, weight + 0.0)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Link that opens the lookup page for a code.
pub fn scan_url(base_url: &str, code: &PrescriptionCode) -> String {
    format!("{}/scan?code={}", base_url.trim_end_matches('/'), code)
}
