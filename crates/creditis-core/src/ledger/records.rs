use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lending::records::LoanTerms;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    /// National identity document number; unique across clients.
    pub national_id: String,
    pub first_names: String,
    pub last_names: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
    }
}

/// Client fields as entered by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInput {
    pub national_id: String,
    pub first_names: String,
    pub last_names: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Active,
    /// Every installment has been paid.
    Settled,
    Cancelled,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Active => f.write_str("active"),
            LoanStatus::Settled => f.write_str("settled"),
            LoanStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: RecordId,
    pub client_national_id: String,
    pub terms: LoanTerms,
    /// Level installment computed when the loan was created.
    pub installment_amount: Money,
    #[serde(default)]
    pub status: LoanStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub client_national_id: String,
    pub terms: LoanTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub loan_id: RecordId,
    pub installment_number: u32,
    pub amount: Money,
    pub date: NaiveDate,
}
