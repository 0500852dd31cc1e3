// Error taxonomy shared by the store, the aggregator and the reminder composer.
//
// InvalidInput and NotFound go back to the operator. StorageCorrupt is
// recovered inside StudentStore::load and never reaches a caller. EmptyInput
// only suppresses the reminder action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("student not found: {0}")]
    NotFound(String),

    #[error("stored student data is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("no students with pending fees")]
    EmptyInput,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput(message.into())
    }

    /// True for errors the operator caused and can fix from the form.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidInput(_) | LedgerError::NotFound(_) | LedgerError::EmptyInput
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
