use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::records::Payment;
use super::schedule::{Installment, InstallmentStatus};
use crate::{CreditisError, CreditisResult, types::*};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One installment as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledInstallment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub due_amount: Money,
    pub status: InstallmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    pub amount_paid: Money,
    /// Due minus paid, floored at zero. A partially paid installment keeps
    /// its shortfall here even though its status is paid.
    pub outstanding: Money,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSchedule {
    pub installments: Vec<ReconciledInstallment>,
    pub total_due: Money,
    pub total_paid: Money,
    pub total_outstanding: Money,
    pub paid_count: u32,
    pub pending_count: u32,
    pub overdue_count: u32,
    pub overdue_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Mark one installment of a loan's schedule as paid.
///
/// The schedule must be the full installment set of a single loan; a number
/// outside it is `InstallmentNotFound`. Paying a paid installment is rejected
/// with `InstallmentAlreadyPaid` and leaves the schedule untouched. Partial
/// amounts are recorded as given: the shortfall is not carried to later
/// installments.
pub fn apply_payment(
    schedule: &mut [Installment],
    installment_number: u32,
    paid_amount: Money,
    paid_date: NaiveDate,
) -> CreditisResult<Installment> {
    if paid_amount <= Decimal::ZERO {
        return Err(CreditisError::InvalidInput {
            field: "paid_amount".into(),
            reason: "Payment amount must be positive.".into(),
        });
    }

    let installment = schedule
        .iter_mut()
        .find(|i| i.number == installment_number)
        .ok_or(CreditisError::InstallmentNotFound {
            number: installment_number,
        })?;

    if installment.is_paid() {
        return Err(CreditisError::InstallmentAlreadyPaid {
            number: installment_number,
            paid_date: installment.paid_date.unwrap_or(installment.due_date),
        });
    }

    installment.status = InstallmentStatus::Paid;
    installment.paid_date = Some(paid_date);
    installment.paid_amount = Some(paid_amount);

    Ok(installment.clone())
}

/// Project a schedule and its payment records into the operator's view.
///
/// Pure: nothing is mutated. Rows come out in installment-number order
/// whatever order storage returned them in. An installment is overdue when
/// it is still pending and its due date is before `today`.
///
/// `schedule` and `payments` must belong to the same loan: installments
/// carry no loan id, so payments are matched by installment number only.
/// Callers holding payments of several loans check them with
/// [`check_single_loan`] first. Totals saturate at `Decimal::MAX`.
pub fn reconcile(
    schedule: &[Installment],
    payments: &[Payment],
    today: NaiveDate,
) -> ReconciledSchedule {
    let mut ordered: Vec<&Installment> = schedule.iter().collect();
    ordered.sort_by_key(|i| i.number);

    let mut rows = Vec::with_capacity(ordered.len());
    let mut total_due = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut total_outstanding = Decimal::ZERO;
    let mut paid_count = 0u32;
    let mut pending_count = 0u32;
    let mut overdue_count = 0u32;
    let mut overdue_amount = Decimal::ZERO;
    let mut next_due: Option<&Installment> = None;

    for inst in ordered {
        let recorded: Money = payments
            .iter()
            .filter(|p| p.installment_number == inst.number)
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.amount));
        let amount_paid = if recorded.is_zero() {
            inst.paid_amount.unwrap_or(Decimal::ZERO)
        } else {
            recorded
        };
        let outstanding = inst.due_amount.saturating_sub(amount_paid).max(Decimal::ZERO);
        let overdue = !inst.is_paid() && inst.due_date < today;

        if inst.is_paid() {
            paid_count += 1;
        } else {
            pending_count += 1;
            if next_due.is_none() {
                next_due = Some(inst);
            }
        }
        if overdue {
            overdue_count += 1;
            overdue_amount = overdue_amount.saturating_add(outstanding);
        }

        total_due = total_due.saturating_add(inst.due_amount);
        total_paid = total_paid.saturating_add(amount_paid);
        total_outstanding = total_outstanding.saturating_add(outstanding);

        rows.push(ReconciledInstallment {
            number: inst.number,
            due_date: inst.due_date,
            due_amount: inst.due_amount,
            status: inst.status,
            paid_date: inst.paid_date,
            amount_paid,
            outstanding,
            overdue,
        });
    }

    ReconciledSchedule {
        installments: rows,
        total_due,
        total_paid,
        total_outstanding,
        paid_count,
        pending_count,
        overdue_count,
        overdue_amount,
        next_due_number: next_due.map(|i| i.number),
        next_due_date: next_due.map(|i| i.due_date),
    }
}

/// Reject a payment list that spans more than one loan.
pub fn check_single_loan(payments: &[Payment]) -> CreditisResult<()> {
    let Some(first) = payments.first() else {
        return Ok(());
    };
    match payments.iter().find(|p| p.loan_id != first.loan_id) {
        Some(other) => Err(CreditisError::InvalidInput {
            field: "payments".into(),
            reason: format!(
                "Payments belong to loans {} and {}; reconcile one loan at a time.",
                first.loan_id, other.loan_id
            ),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::records::{LoanTerms, PaymentFrequency};
    use crate::lending::schedule::generate_schedule;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn schedule() -> Vec<Installment> {
        generate_schedule(&LoanTerms {
            principal: dec!(1_000),
            monthly_rate_pct: dec!(10),
            term_months: 3,
            payment_frequency: PaymentFrequency::Monthly,
            disbursement_date: d(2025, 1, 10),
            first_payment_date: d(2025, 2, 10),
        })
    }

    fn payment(id: u64, number: u32, amount: Money, date: NaiveDate) -> Payment {
        payment_for(1, id, number, amount, date)
    }

    fn payment_for(
        loan_id: u64,
        id: u64,
        number: u32,
        amount: Money,
        date: NaiveDate,
    ) -> Payment {
        Payment {
            id,
            loan_id,
            installment_number: number,
            amount,
            date,
            recorded_at: date.and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_apply_payment_marks_paid() {
        let mut s = schedule();
        let paid = apply_payment(&mut s, 1, dec!(402.11), d(2025, 2, 9)).unwrap();
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_date, Some(d(2025, 2, 9)));
        assert_eq!(paid.paid_amount, Some(dec!(402.11)));
        assert_eq!(s[0], paid);
        assert_eq!(s[1].status, InstallmentStatus::Pending);
    }

    #[test]
    fn test_second_payment_rejected_state_unchanged() {
        let mut s = schedule();
        apply_payment(&mut s, 2, dec!(402.11), d(2025, 3, 10)).unwrap();
        let after_first = s.clone();

        let err = apply_payment(&mut s, 2, dec!(500), d(2025, 3, 11)).unwrap_err();
        match err {
            CreditisError::InstallmentAlreadyPaid { number, paid_date } => {
                assert_eq!(number, 2);
                assert_eq!(paid_date, d(2025, 3, 10));
            }
            other => panic!("Expected InstallmentAlreadyPaid, got {other:?}"),
        }
        assert_eq!(s, after_first);
    }

    #[test]
    fn test_unknown_installment_not_found() {
        let mut s = schedule();
        for number in [0, 4, 99] {
            match apply_payment(&mut s, number, dec!(10), d(2025, 2, 10)).unwrap_err() {
                CreditisError::InstallmentNotFound { number: n } => assert_eq!(n, number),
                other => panic!("Expected InstallmentNotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut s = schedule();
        assert!(matches!(
            apply_payment(&mut s, 1, Decimal::ZERO, d(2025, 2, 10)),
            Err(CreditisError::InvalidInput { .. })
        ));
        assert!(s.iter().all(|i| !i.is_paid()));
    }

    #[test]
    fn test_partial_payment_recorded_as_is() {
        let mut s = schedule();
        let paid = apply_payment(&mut s, 1, dec!(100), d(2025, 2, 10)).unwrap();
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_amount, Some(dec!(100)));
        // Later installments are not adjusted.
        assert_eq!(s[1].due_amount, dec!(402.11));
    }

    #[test]
    fn test_reconcile_restores_number_order() {
        let mut s = schedule();
        s.reverse();
        let view = reconcile(&s, &[], d(2025, 1, 1));
        let numbers: Vec<u32> = view.installments.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_reconcile_overdue_only_for_pending_past_due() {
        let mut s = schedule();
        apply_payment(&mut s, 1, dec!(402.11), d(2025, 2, 10)).unwrap();
        let payments = vec![payment(1, 1, dec!(402.11), d(2025, 2, 10))];

        // Installment 2 due 2025-03-10, installment 3 due 2025-04-10.
        let view = reconcile(&s, &payments, d(2025, 3, 20));
        assert!(!view.installments[0].overdue);
        assert!(view.installments[1].overdue);
        assert!(!view.installments[2].overdue);
        assert_eq!(view.overdue_count, 1);
        assert_eq!(view.overdue_amount, dec!(402.11));
        assert_eq!(view.paid_count, 1);
        assert_eq!(view.pending_count, 2);
        assert_eq!(view.next_due_number, Some(2));
        assert_eq!(view.next_due_date, Some(d(2025, 3, 10)));
    }

    #[test]
    fn test_reconcile_due_today_is_not_overdue() {
        let s = schedule();
        let view = reconcile(&s, &[], d(2025, 2, 10));
        assert!(!view.installments[0].overdue);
        assert_eq!(view.overdue_count, 0);
    }

    #[test]
    fn test_reconcile_totals() {
        let mut s = schedule();
        apply_payment(&mut s, 1, dec!(402.11), d(2025, 2, 10)).unwrap();
        let payments = vec![payment(1, 1, dec!(402.11), d(2025, 2, 10))];
        let view = reconcile(&s, &payments, d(2025, 2, 11));
        assert_eq!(view.total_due, dec!(1_206.35));
        assert_eq!(view.total_paid, dec!(402.11));
        assert_eq!(view.total_outstanding, dec!(804.24));
    }

    #[test]
    fn test_reconcile_partial_payment_leaves_shortfall() {
        let mut s = schedule();
        apply_payment(&mut s, 1, dec!(400), d(2025, 2, 10)).unwrap();
        let view = reconcile(&s, &[], d(2025, 2, 11));
        let first = &view.installments[0];
        assert_eq!(first.status, InstallmentStatus::Paid);
        assert_eq!(first.amount_paid, dec!(400));
        assert_eq!(first.outstanding, dec!(2.11));
        assert!(!first.overdue);
    }

    #[test]
    fn test_reconcile_does_not_mutate() {
        let s = schedule();
        let before = s.clone();
        let _ = reconcile(&s, &[], d(2030, 1, 1));
        assert_eq!(s, before);
    }

    #[test]
    fn test_reconcile_fully_paid_has_no_next_due() {
        let mut s = schedule();
        for n in 1..=3 {
            let due = s[(n - 1) as usize].due_amount;
            apply_payment(&mut s, n, due, d(2025, 2, 1)).unwrap();
        }
        let view = reconcile(&s, &[], d(2026, 1, 1));
        assert_eq!(view.pending_count, 0);
        assert_eq!(view.total_outstanding, Decimal::ZERO);
        assert_eq!(view.next_due_number, None);
    }

    #[test]
    fn test_single_loan_check() {
        let same = vec![
            payment(1, 1, dec!(402.11), d(2025, 2, 10)),
            payment(2, 2, dec!(402.11), d(2025, 3, 10)),
        ];
        assert!(check_single_loan(&same).is_ok());
        assert!(check_single_loan(&[]).is_ok());

        let mixed = vec![
            payment(1, 1, dec!(402.11), d(2025, 2, 10)),
            payment_for(7, 2, 1, dec!(402.11), d(2025, 2, 10)),
        ];
        match check_single_loan(&mixed).unwrap_err() {
            CreditisError::InvalidInput { field, reason } => {
                assert_eq!(field, "payments");
                assert!(reason.contains("1 and 7"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_reconcile_huge_amounts_saturate() {
        let mut s = schedule();
        s[0].due_amount = Decimal::MAX;
        s[1].due_amount = Decimal::MAX;
        let payments = vec![
            payment(1, 3, Decimal::MAX, d(2025, 4, 10)),
            payment(2, 3, Decimal::MAX, d(2025, 4, 10)),
        ];
        let view = reconcile(&s, &payments, d(2026, 1, 1));
        assert_eq!(view.total_due, Decimal::MAX);
        assert_eq!(view.installments[2].amount_paid, Decimal::MAX);
        assert_eq!(view.installments[2].outstanding, Decimal::ZERO);
        assert_eq!(view.overdue_amount, Decimal::MAX);
    }
}
