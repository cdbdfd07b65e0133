//! Prescription code generation.
//!
//! Codes are 8 symbols from a 64-symbol URL-safe alphabet, about 2^48
//! possible values. Randomness comes from the operating system CSPRNG.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CODE_LENGTH: usize = 8;

/// URL-safe alphabet. 64 symbols, so masking a random byte to 6 bits
/// selects each symbol with equal probability.
pub const ALPHABET: &[u8; 64] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

#[derive(Error, Debug)]
pub enum CodeError {
    #[error("Random source unavailable: {0}")]
    RandomSource(getrandom::Error),

    #[error("Invalid prescription code {0:?}")]
    Invalid(String),
}

/// The public lookup key of a prescription. Always a valid code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrescriptionCode(String);

impl PrescriptionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrescriptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrescriptionCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_code(s) {
            Ok(PrescriptionCode(s.to_string()))
        } else {
            Err(CodeError::Invalid(s.to_string()))
        }
    }
}

impl TryFrom<String> for PrescriptionCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_code(&value) {
            Ok(PrescriptionCode(value))
        } else {
            Err(CodeError::Invalid(value))
        }
    }
}

impl From<PrescriptionCode> for String {
    fn from(code: PrescriptionCode) -> Self {
        code.0
    }
}

/// Generates a new code. Fails only if the OS random source does.
pub fn generate_code() -> Result<PrescriptionCode, CodeError> {
    let mut bytes = [0u8; CODE_LENGTH];
    getrandom::getrandom(&mut bytes).map_err(CodeError::RandomSource)?;
    Ok(code_from_bytes(bytes))
}

fn code_from_bytes(bytes: [u8; CODE_LENGTH]) -> PrescriptionCode {
    let code = bytes
        .iter()
        .map(|byte| ALPHABET[(byte & 63) as usize] as char)
        .collect();
    PrescriptionCode(code)
}

pub fn is_valid_code(candidate: &str) -> bool {
    candidate.len() == CODE_LENGTH && candidate.bytes().all(|b| ALPHABET.contains(&b))
}
