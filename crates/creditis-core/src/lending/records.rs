use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CreditisError, CreditisResult, types::*};

/// How often the borrower intends to pay. Informational only: schedules are
/// always generated in calendar months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentFrequency::Daily => "daily",
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
        };
        f.write_str(label)
    }
}

/// Longest accepted term: one hundred years of monthly installments.
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// Largest accepted principal, 10^15. Keeps the balance walk well inside
/// the decimal range for any realistic rate.
pub const MAX_PRINCIPAL: Money = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Terms fixed when a loan is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Monthly interest rate in percent (2 = 2% per month). Zero means
    /// interest-free.
    pub monthly_rate_pct: RatePct,
    pub term_months: u32,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
}

impl LoanTerms {
    /// Monthly rate as a decimal fraction.
    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate_pct / Decimal::ONE_HUNDRED
    }

    /// Boundary check for terms entered by an operator. The pure calculators
    /// stay tolerant of bad terms; everything that persists a loan calls this
    /// first.
    pub fn validate(&self) -> CreditisResult<()> {
        validate_amounts(self.principal, self.monthly_rate_pct, self.term_months)?;
        if self.first_payment_date < self.disbursement_date {
            return Err(CreditisError::InvalidInput {
                field: "first_payment_date".into(),
                reason: format!(
                    "First payment ({}) cannot precede disbursement ({}).",
                    self.first_payment_date, self.disbursement_date
                ),
            });
        }
        Ok(())
    }
}

/// Principal, rate and term bounds shared by every strict entry point.
pub(crate) fn validate_amounts(
    principal: Money,
    monthly_rate_pct: RatePct,
    term_months: u32,
) -> CreditisResult<()> {
    if principal <= Decimal::ZERO {
        return Err(CreditisError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if principal > MAX_PRINCIPAL {
        return Err(CreditisError::InvalidInput {
            field: "principal".into(),
            reason: format!("Principal cannot exceed {MAX_PRINCIPAL}."),
        });
    }
    if monthly_rate_pct < Decimal::ZERO {
        return Err(CreditisError::InvalidInput {
            field: "monthly_rate_pct".into(),
            reason: "Monthly rate cannot be negative.".into(),
        });
    }
    if term_months == 0 {
        return Err(CreditisError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month.".into(),
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(CreditisError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months."),
        });
    }
    Ok(())
}

/// A payment recorded against one installment of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub loan_id: RecordId,
    pub installment_number: u32,
    pub amount: Money,
    pub date: NaiveDate,
    pub recorded_at: NaiveDateTime,
}
