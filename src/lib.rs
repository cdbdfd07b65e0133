//! rxcode: prescription codes, QR payloads and display dates
//!
//! Doctors create prescriptions (patient data plus a medication list) that
//! are later retrieved by a short generated code. This crate holds the
//! pieces with actual logic:
//!
//! - [`encoding::code`] issues the 8-symbol lookup code
//! - [`encoding::qr`] derives the compact medication summary shown as a QR code
//! - [`encoding::date`] renders the long-form display date
//!
//! Storage is a collaborator behind [`storage::PrescriptionStore`]; the
//! bundled server uses the in-memory implementation.

pub mod api;
pub mod config;
pub mod encoding;
pub mod error;
pub mod log;
pub mod prescription;
pub mod service;
pub mod storage;

pub use encoding::code::{generate_code, PrescriptionCode};
pub use encoding::date::format_display_date;
pub use encoding::qr::{encode_qr_payload, LetterKeys};
pub use error::RxError;
pub use prescription::{Gender, Medication, Patient, Prescription, MEDICATION_CATALOG};
