use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::encoding::code::{generate_code, is_valid_code, CodeError, PrescriptionCode};
use crate::encoding::date::DisplayClock;
use crate::encoding::qr::{self, LetterKeys, DEFAULT_SCAN_BASE_URL};
use crate::error::RxError;
use crate::log::{CREATE, LOOKUP};
use crate::prescription::draft::PrescriptionDraft;
use crate::prescription::Prescription;
use crate::storage::{self, DashboardSummary, PrescriptionStore, StoreError};

/// Fresh codes tried before giving up on a create.
pub const MAX_CODE_ATTEMPTS: u32 = 3;

type CodeSource = fn() -> Result<PrescriptionCode, CodeError>;

/// A stored prescription together with everything needed to display it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionView {
    pub prescription: Prescription,
    pub qr_payload: String,
    pub scan_url: String,
    pub display_date: String,
}

pub struct PrescriptionService {
    store: Arc<dyn PrescriptionStore>,
    keys: LetterKeys,
    clock: DisplayClock,
    scan_base_url: String,
    code_source: CodeSource,
}

impl PrescriptionService {
    pub fn new(store: Arc<dyn PrescriptionStore>) -> Self {
        PrescriptionService {
            store,
            keys: LetterKeys::default(),
            clock: DisplayClock::default(),
            scan_base_url: DEFAULT_SCAN_BASE_URL.to_string(),
            code_source: generate_code,
        }
    }

    pub fn with_letter_keys(mut self, keys: LetterKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_clock(mut self, clock: DisplayClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_scan_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.scan_base_url = base_url.into();
        self
    }

    pub fn with_code_source(mut self, code_source: CodeSource) -> Self {
        self.code_source = code_source;
        self
    }

    pub fn letter_keys(&self) -> &LetterKeys {
        &self.keys
    }

    /// Assigns a code and a creation date to the draft and stores it.
    /// A code already taken in the store is replaced by a fresh one.
    pub fn create(&self, draft: PrescriptionDraft) -> Result<PrescriptionView, RxError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = (self.code_source)()?;
            let prescription = draft.clone().into_prescription(code, Utc::now())?;

            match self.store.insert(prescription) {
                Ok(stored) => {
                    info!(
                        target: CREATE,
                        code = %stored.prescription_code,
                        doctor_id = %stored.doctor_id,
                        medications = stored.medications.len(),
                        "Prescription created"
                    );
                    return Ok(self.view(stored));
                }
                Err(StoreError::DuplicateCode(taken)) => {
                    warn!(
                        target: CREATE,
                        code = %taken,
                        attempt,
                        "Prescription code collision"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(RxError::CodeExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    pub fn lookup(&self, code: &str) -> Result<Option<PrescriptionView>, RxError> {
        let code = code.trim();
        if !is_valid_code(code) {
            debug!(target: LOOKUP, code, "Rejected malformed code");
            return Err(CodeError::Invalid(code.to_string()).into());
        }

        let found = self.store.find_by_code(code)?;
        debug!(target: LOOKUP, code, found = found.is_some(), "Prescription lookup");
        Ok(found.map(|prescription| self.view(prescription)))
    }

    pub fn dashboard(&self, doctor_id: &str) -> Result<DashboardSummary, RxError> {
        Ok(storage::dashboard_summary(self.store.as_ref(), doctor_id)?)
    }

    pub fn qr_payload(&self, prescription: &Prescription) -> String {
        qr::encode_qr_payload(prescription, &self.keys)
    }

    pub fn view(&self, prescription: Prescription) -> PrescriptionView {
        PrescriptionView {
            qr_payload: self.qr_payload(&prescription),
            scan_url: qr::scan_url(&self.scan_base_url, &prescription.prescription_code),
            display_date: self.clock.format(&prescription.date),
            prescription,
        }
    }
}
