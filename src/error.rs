use thiserror::Error;

use crate::config::ConfigError;
use crate::encoding::code::CodeError;
use crate::prescription::draft::DraftError;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum RxError {
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not allocate a unique prescription code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },
}
