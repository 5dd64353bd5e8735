use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditisError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Installment {number} not found in schedule")]
    InstallmentNotFound { number: u32 },

    #[error("Installment {number} was already paid on {paid_date}")]
    InstallmentAlreadyPaid { number: u32, paid_date: NaiveDate },

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(u64),

    #[error("Loan {loan_id} is {status}, not active")]
    LoanNotActive { loan_id: u64, status: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditisError {
    fn from(e: serde_json::Error) -> Self {
        CreditisError::SerializationError(e.to_string())
    }
}
