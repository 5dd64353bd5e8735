use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::amortization::monthly_payment;
use super::records::{LoanTerms, PaymentFrequency, MAX_TERM_MONTHS};
use crate::calendar::add_months;
use crate::{CreditisError, CreditisResult, types::*};

/// Payment state of a single installment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallmentStatus::Pending => f.write_str("pending"),
            InstallmentStatus::Paid => f.write_str("paid"),
        }
    }
}

/// One scheduled due payment within a loan's term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based, contiguous within the loan.
    pub number: u32,
    pub due_date: NaiveDate,
    pub due_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Principal still owed once this installment is paid as scheduled.
    pub balance_after: Money,
    #[serde(default)]
    pub status: InstallmentStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paid_amount: Option<Money>,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub installments: Vec<Installment>,
    pub total_due: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    /// Last installment minus the level payment: the rounding residue it absorbed.
    pub final_adjustment: Money,
}

/// Principal/interest split of one period, before dates are attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AmortizationRow {
    pub number: u32,
    pub due_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub balance_after: Money,
}

/// Generate the full installment schedule for a loan.
///
/// Installment `i` falls due `i - 1` calendar months after the first payment
/// date (end-of-month days clamp, see [`add_months`]). Every installment
/// charges the level payment except the last, which settles the remaining
/// balance plus its interest so the schedule totals principal plus interest
/// exactly.
///
/// Returns an empty schedule for a zero term, a non-positive principal, a
/// negative rate, a term above [`MAX_TERM_MONTHS`], or terms whose amounts
/// or dates leave the representable range.
pub fn generate_schedule(terms: &LoanTerms) -> Vec<Installment> {
    installments_for(terms).unwrap_or_default()
}

/// Strict counterpart of [`generate_schedule`]: invalid terms are
/// `InvalidInput` and a schedule that cannot be represented is an error
/// rather than empty.
pub fn try_generate_schedule(terms: &LoanTerms) -> CreditisResult<Vec<Installment>> {
    terms.validate()?;
    installments_for(terms).ok_or_else(out_of_range)
}

/// Schedule with totals for presentation. Terms are validated strictly.
pub fn build_schedule(terms: &LoanTerms) -> CreditisResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let installments = try_generate_schedule(terms)?;
    let payment = monthly_payment(terms.principal, terms.monthly_rate_pct, terms.term_months);

    let total_due =
        checked_sum(installments.iter().map(|i| i.due_amount)).ok_or_else(out_of_range)?;
    let total_principal = checked_sum(installments.iter().map(|i| i.principal_portion))
        .ok_or_else(out_of_range)?;
    let total_interest = checked_sum(installments.iter().map(|i| i.interest_portion))
        .ok_or_else(out_of_range)?;
    let final_adjustment = installments
        .last()
        .and_then(|i| i.due_amount.checked_sub(payment))
        .unwrap_or(Decimal::ZERO);

    if payment.is_zero() {
        warnings.push("Monthly payment degenerated to zero".into());
    }
    if terms.payment_frequency != PaymentFrequency::Monthly {
        warnings.push(format!(
            "Payment frequency '{}' is informational; installments fall due monthly",
            terms.payment_frequency
        ));
    }

    let output = ScheduleOutput {
        monthly_payment: payment,
        installments,
        total_due,
        total_principal,
        total_interest,
        final_adjustment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French Amortization Schedule",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "monthly_rate_pct": terms.monthly_rate_pct.to_string(),
            "term_months": terms.term_months,
            "first_payment_date": terms.first_payment_date,
            "month_end": "clamped to the last day of shorter months",
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn installments_for(terms: &LoanTerms) -> Option<Vec<Installment>> {
    if terms.principal <= Decimal::ZERO || terms.monthly_rate_pct < Decimal::ZERO {
        return None;
    }

    let payment = monthly_payment(terms.principal, terms.monthly_rate_pct, terms.term_months);
    let rows = amortization_rows(
        terms.principal,
        terms.monthly_rate_pct,
        terms.term_months,
        payment,
    )?;

    rows.into_iter()
        .map(|row| {
            Some(Installment {
                number: row.number,
                due_date: add_months(terms.first_payment_date, row.number - 1)?,
                due_amount: row.due_amount,
                principal_portion: row.principal_portion,
                interest_portion: row.interest_portion,
                balance_after: row.balance_after,
                status: InstallmentStatus::Pending,
                paid_date: None,
                paid_amount: None,
            })
        })
        .collect()
}

pub(crate) fn out_of_range() -> CreditisError {
    CreditisError::InvalidInput {
        field: "terms".into(),
        reason: "Schedule amounts or due dates exceed the representable range.".into(),
    }
}

/// Walk the balance down period by period.
///
/// Interest is charged on the opening balance and rounded to cents; the
/// principal portion is whatever the level payment leaves, never more than
/// the balance. The last period repays the whole remaining balance.
/// `None` for a zero term, a term above [`MAX_TERM_MONTHS`] or on overflow.
pub(crate) fn amortization_rows(
    principal: Money,
    monthly_rate_pct: RatePct,
    term_months: u32,
    payment: Money,
) -> Option<Vec<AmortizationRow>> {
    if term_months == 0 || term_months > MAX_TERM_MONTHS {
        return None;
    }

    let rate = monthly_rate_pct / Decimal::ONE_HUNDRED;
    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for number in 1..=term_months {
        let interest = round_currency(balance.checked_mul(rate)?);
        let principal_portion = if number == term_months {
            balance
        } else {
            payment
                .checked_sub(interest)?
                .max(Decimal::ZERO)
                .min(balance)
        };
        balance = balance.checked_sub(principal_portion)?;

        rows.push(AmortizationRow {
            number,
            due_amount: principal_portion.checked_add(interest)?,
            principal_portion,
            interest_portion: interest,
            balance_after: balance,
        });
    }

    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::records::MAX_PRINCIPAL;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn terms(principal: Money, rate: RatePct, term: u32) -> LoanTerms {
        LoanTerms {
            principal,
            monthly_rate_pct: rate,
            term_months: term,
            payment_frequency: PaymentFrequency::Monthly,
            disbursement_date: d(2025, 1, 15),
            first_payment_date: d(2025, 2, 15),
        }
    }

    #[test]
    fn test_twelve_installments_ordered() {
        let schedule = generate_schedule(&terms(dec!(10_000), dec!(2), 12));
        assert_eq!(schedule.len(), 12);
        for (idx, inst) in schedule.iter().enumerate() {
            assert_eq!(inst.number, idx as u32 + 1);
            assert_eq!(inst.status, InstallmentStatus::Pending);
            assert!(inst.paid_date.is_none());
            assert!(inst.paid_amount.is_none());
        }
        for pair in schedule.windows(2) {
            assert!(pair[0].due_date < pair[1].due_date);
        }
        assert_eq!(schedule[0].due_date, d(2025, 2, 15));
        assert_eq!(schedule[11].due_date, d(2026, 1, 15));
    }

    #[test]
    fn test_level_payment_then_residue() {
        let schedule = generate_schedule(&terms(dec!(10_000), dec!(2), 12));
        for inst in &schedule[..11] {
            assert_eq!(inst.due_amount, dec!(945.60));
        }
        assert_eq!(schedule[11].due_amount, dec!(945.55));
        assert_eq!(schedule[11].balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_first_period_split() {
        let schedule = generate_schedule(&terms(dec!(10_000), dec!(2), 12));
        // interest = 10_000 * 0.02 = 200; principal = 945.60 - 200
        assert_eq!(schedule[0].interest_portion, dec!(200.00));
        assert_eq!(schedule[0].principal_portion, dec!(745.60));
        assert_eq!(schedule[0].balance_after, dec!(9_254.40));
    }

    #[test]
    fn test_sum_equals_principal_plus_interest() {
        for (p, r, n) in [
            (dec!(10_000), dec!(2), 12),
            (dec!(5_000_000), dec!(3.5), 24),
            (dec!(2_000_000), dec!(5), 2),
            (dec!(1_234.56), dec!(1.1), 60),
        ] {
            let schedule = generate_schedule(&terms(p, r, n));
            let total_due: Money = schedule.iter().map(|i| i.due_amount).sum();
            let total_interest: Money = schedule.iter().map(|i| i.interest_portion).sum();
            let total_principal: Money = schedule.iter().map(|i| i.principal_portion).sum();
            assert!((total_due - (p + total_interest)).abs() <= dec!(0.01));
            assert_eq!(total_principal, p);
        }
    }

    #[test]
    fn test_last_installment_within_rounding_of_level() {
        let schedule = generate_schedule(&terms(dec!(5_000_000), dec!(3.5), 24));
        let level = schedule[0].due_amount;
        let last = schedule.last().unwrap().due_amount;
        assert_eq!(level, dec!(311_364.15));
        assert_eq!(last, dec!(311_364.18));
        assert!((last - level).abs() < dec!(1));
    }

    #[test]
    fn test_zero_rate_residue_on_last() {
        let schedule = generate_schedule(&terms(dec!(100), Decimal::ZERO, 3));
        let dues: Vec<Money> = schedule.iter().map(|i| i.due_amount).collect();
        assert_eq!(dues, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert!(schedule.iter().all(|i| i.interest_portion.is_zero()));
    }

    #[test]
    fn test_month_end_clamps_then_recovers() {
        let mut t = terms(dec!(3_000), dec!(1), 3);
        t.disbursement_date = d(2025, 1, 1);
        t.first_payment_date = d(2025, 1, 31);
        let dates: Vec<NaiveDate> = generate_schedule(&t).iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31)]);
    }

    #[test]
    fn test_month_end_leap_year() {
        let mut t = terms(dec!(3_000), dec!(1), 3);
        t.disbursement_date = d(2024, 1, 1);
        t.first_payment_date = d(2024, 1, 31);
        let dates: Vec<NaiveDate> = generate_schedule(&t).iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)]);
    }

    #[test]
    fn test_invalid_terms_yield_empty_schedule() {
        assert!(generate_schedule(&terms(dec!(10_000), dec!(2), 0)).is_empty());
        assert!(generate_schedule(&terms(Decimal::ZERO, dec!(2), 12)).is_empty());
        assert!(generate_schedule(&terms(dec!(-1), dec!(2), 12)).is_empty());
        assert!(generate_schedule(&terms(dec!(10_000), dec!(-2), 12)).is_empty());
    }

    #[test]
    fn test_sub_cent_loan_never_overpays() {
        // 0.05 over 10 months at 0%: level payment rounds up to 0.01, so the
        // balance runs out early and later installments fall to zero.
        let schedule = generate_schedule(&terms(dec!(0.05), Decimal::ZERO, 10));
        let total: Money = schedule.iter().map(|i| i.due_amount).sum();
        assert_eq!(total, dec!(0.05));
        assert!(schedule.iter().all(|i| i.due_amount >= Decimal::ZERO));
    }

    #[test]
    fn test_build_schedule_totals() {
        let out = build_schedule(&terms(dec!(2_000_000), dec!(5), 2)).unwrap();
        let r = &out.result;
        assert_eq!(r.monthly_payment, dec!(1_075_609.76));
        assert_eq!(r.installments.len(), 2);
        assert_eq!(r.total_principal, dec!(2_000_000));
        assert_eq!(r.total_interest, dec!(151_219.51));
        assert_eq!(r.total_due, dec!(2_151_219.51));
        assert_eq!(r.final_adjustment, dec!(-0.01));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_build_schedule_rejects_invalid_terms() {
        assert!(build_schedule(&terms(dec!(10_000), dec!(2), 0)).is_err());
    }

    #[test]
    fn test_overflowing_walk_yields_empty_schedule() {
        // 5e28 at 200% per month: the first interest charge overflows.
        let huge = dec!(50_000_000_000_000_000_000_000_000_000);
        assert!(generate_schedule(&terms(huge, dec!(200), 2)).is_empty());
    }

    #[test]
    fn test_build_schedule_rejects_principal_above_max() {
        let huge = dec!(50_000_000_000_000_000_000_000_000_000);
        match build_schedule(&terms(huge, dec!(50), 2)).unwrap_err() {
            CreditisError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_build_schedule_rejects_rate_that_overflows() {
        // 10^12 at 10^20 % per month: interest of 10^30 per period.
        let t = terms(dec!(1_000_000_000_000), dec!(100_000_000_000_000_000_000), 2);
        assert!(generate_schedule(&t).is_empty());
        match build_schedule(&t).unwrap_err() {
            CreditisError::InvalidInput { field, .. } => assert_eq!(field, "terms"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_build_schedule_rejects_totals_that_overflow() {
        // Each installment fits (about 5e28) but two of them do not.
        let t = terms(MAX_PRINCIPAL, dec!(5_000_000_000_000_000), 2);
        assert_eq!(generate_schedule(&t).len(), 2);
        assert!(matches!(
            build_schedule(&t),
            Err(CreditisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_term_above_max_yields_empty_schedule() {
        assert!(generate_schedule(&terms(dec!(1_000), dec!(1), MAX_TERM_MONTHS + 1)).is_empty());
        assert!(generate_schedule(&terms(dec!(1_000), dec!(1), u32::MAX)).is_empty());
        assert_eq!(
            generate_schedule(&terms(dec!(1_000), dec!(1), MAX_TERM_MONTHS)).len(),
            MAX_TERM_MONTHS as usize
        );
    }

    #[test]
    fn test_due_dates_beyond_calendar_yield_empty_schedule() {
        let mut t = terms(dec!(1_000), dec!(1), 3);
        t.disbursement_date = NaiveDate::MAX;
        t.first_payment_date = NaiveDate::MAX;
        assert!(generate_schedule(&t).is_empty());
        assert!(build_schedule(&t).is_err());
    }

    #[test]
    fn test_build_schedule_warns_on_non_monthly_label() {
        let mut t = terms(dec!(1_000), dec!(1), 4);
        t.payment_frequency = PaymentFrequency::Weekly;
        let out = build_schedule(&t).unwrap();
        assert_eq!(out.result.installments.len(), 4);
        assert_eq!(out.warnings.len(), 1);
    }
}
