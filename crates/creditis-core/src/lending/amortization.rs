use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::records::validate_amounts;
use super::schedule::{amortization_rows, out_of_range};
use crate::{CreditisResult, types::*};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Monthly interest rate in percent (5 = 5% per month).
    pub monthly_rate_pct: RatePct,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Level installment, rounded to cents.
    pub monthly_payment: Money,
    pub monthly_rate: Rate,
    /// Sum of every installment once the last one absorbs rounding residue.
    pub total_payable: Money,
    pub total_interest: Money,
    pub final_installment: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed monthly installment under French amortization.
///
/// `payment = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate
/// as a fraction, rounded to cents once at the very end. Zero rate divides
/// the principal evenly.
///
/// Tolerant by contract: a non-positive principal, a zero term or a negative
/// rate yield 0 instead of an error, and so does a degenerate denominator.
pub fn monthly_payment(principal: Money, monthly_rate_pct: RatePct, term_months: u32) -> Money {
    if principal <= Decimal::ZERO || term_months == 0 || monthly_rate_pct < Decimal::ZERO {
        return Decimal::ZERO;
    }

    if monthly_rate_pct.is_zero() {
        return round_currency(principal / Decimal::from(term_months));
    }

    let rate = monthly_rate_pct / Decimal::ONE_HUNDRED;

    // (1 + r)^n beyond the decimal range: 1 / (1 + r)^n vanishes and the
    // annuity collapses to pure interest.
    let Some(factor) = (Decimal::ONE + rate).checked_powu(u64::from(term_months)) else {
        return principal
            .checked_mul(rate)
            .map(round_currency)
            .unwrap_or(Decimal::ZERO);
    };

    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }

    // Dividing factor by denominator first keeps P * r * factor from
    // overflowing on long terms.
    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_mul(factor / denominator))
        .map(round_currency)
        .unwrap_or(Decimal::ZERO)
}

/// Monthly payment with totals for presentation, validated strictly.
pub fn calculate_amortization(
    input: &AmortizationInput,
) -> CreditisResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_amounts(input.principal, input.monthly_rate_pct, input.term_months)?;

    let payment = monthly_payment(input.principal, input.monthly_rate_pct, input.term_months);
    if payment.is_zero() {
        warnings.push(
            "Monthly payment degenerated to zero; the whole balance falls on the last installment"
                .into(),
        );
    }

    let rows = amortization_rows(
        input.principal,
        input.monthly_rate_pct,
        input.term_months,
        payment,
    )
    .ok_or_else(out_of_range)?;
    let total_payable =
        checked_sum(rows.iter().map(|r| r.due_amount)).ok_or_else(out_of_range)?;
    let total_interest =
        checked_sum(rows.iter().map(|r| r.interest_portion)).ok_or_else(out_of_range)?;
    let final_installment = rows.last().map(|r| r.due_amount).unwrap_or(Decimal::ZERO);

    let output = AmortizationOutput {
        monthly_payment: payment,
        monthly_rate: input.monthly_rate_pct / Decimal::ONE_HUNDRED,
        total_payable,
        total_interest,
        final_installment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "method": "french",
        "rounding": "2dp, half away from zero, final result only",
        "residue": "absorbed by the last installment",
    });

    Ok(with_metadata(
        "French Amortization (level monthly installment)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
