use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::records::{Client, ClientInput, Loan, LoanApplication, LoanStatus, PaymentRequest};
use super::store::LedgerStore;
use crate::lending::amortization::monthly_payment;
use crate::lending::reconcile::{apply_payment, reconcile, ReconciledSchedule};
use crate::lending::records::Payment;
use crate::lending::schedule::{try_generate_schedule, Installment};
use crate::{CreditisError, CreditisResult, types::*};

const UNKNOWN_CLIENT: &str = "(unknown client)";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A loan with its reconciled installment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPlan {
    pub loan: Loan,
    pub client_name: String,
    pub schedule: ReconciledSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: RecordId,
    pub client_national_id: String,
    pub client_name: String,
    pub principal: Money,
    pub installment_amount: Money,
    pub term_months: u32,
    pub status: LoanStatus,
}

/// Everything a payment receipt shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub receipt_number: RecordId,
    pub issued_at: NaiveDateTime,
    pub client_name: String,
    pub client_national_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    pub loan_id: RecordId,
    pub principal: Money,
    pub installment_number: u32,
    pub installment_due: Money,
    pub amount_paid: Money,
    pub payment_date: NaiveDate,
    /// Outstanding across the whole plan after this payment.
    pub remaining_balance: Money,
    pub loan_status: LoanStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub client_count: u32,
    pub active_loans: u32,
    pub settled_loans: u32,
    pub cancelled_loans: u32,
    /// Principal of every loan that was not cancelled.
    pub principal_lent: Money,
    pub amount_collected: Money,
    pub amount_outstanding: Money,
    pub overdue_installments: u32,
    pub overdue_amount: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Register a client, or update the one with the same national id.
pub fn register_client<S: LedgerStore>(store: &mut S, input: ClientInput) -> CreditisResult<Client> {
    let input = ClientInput {
        national_id: input.national_id.trim().to_string(),
        first_names: input.first_names.trim().to_string(),
        last_names: input.last_names.trim().to_string(),
        phone: non_blank(input.phone),
        address: non_blank(input.address),
    };
    validate_client(&input)?;

    let client = store.upsert_client(input)?;
    info!(client_id = client.id, national_id = %client.national_id, "client registered");
    Ok(client)
}

/// Create a loan for an existing client and persist its installment batch.
pub fn register_loan<S: LedgerStore>(
    store: &mut S,
    application: LoanApplication,
    created_at: NaiveDateTime,
) -> CreditisResult<LoanPlan> {
    let installments = try_generate_schedule(&application.terms)?;

    let national_id = application.client_national_id.trim();
    let client = store
        .client(national_id)?
        .ok_or_else(|| CreditisError::ClientNotFound(national_id.to_string()))?;

    let terms = application.terms;
    let installment_amount =
        monthly_payment(terms.principal, terms.monthly_rate_pct, terms.term_months);

    let loan = Loan {
        id: store.next_loan_id()?,
        client_national_id: client.national_id.clone(),
        terms,
        installment_amount,
        status: LoanStatus::Active,
        created_at,
    };
    store.insert_loan(loan.clone())?;
    store.put_installments(loan.id, installments.clone())?;

    info!(
        loan_id = loan.id,
        national_id = %client.national_id,
        principal = %loan.terms.principal,
        installments = installments.len(),
        "loan registered"
    );

    Ok(LoanPlan {
        schedule: reconcile(&installments, &[], created_at.date()),
        client_name: client.full_name(),
        loan,
    })
}

/// Record a payment against one installment and issue the receipt.
///
/// The installment is marked paid and the payment appended; once every
/// installment is paid the loan becomes settled.
pub fn record_payment<S: LedgerStore>(
    store: &mut S,
    request: PaymentRequest,
    recorded_at: NaiveDateTime,
) -> CreditisResult<PaymentReceipt> {
    let mut loan = active_loan(store, request.loan_id)?;

    let mut installments = store.installments(loan.id)?;
    let paid = apply_payment(
        &mut installments,
        request.installment_number,
        request.amount,
        request.date,
    )
    .inspect_err(|e| warn!(loan_id = loan.id, error = %e, "payment rejected"))?;

    store.put_installments(loan.id, installments.clone())?;
    let payment = store.append_payment(&request, recorded_at)?;

    if installments.iter().all(Installment::is_paid) {
        loan.status = LoanStatus::Settled;
        store.update_loan(&loan)?;
        info!(loan_id = loan.id, "loan settled");
    }

    if paid.paid_amount.unwrap_or(Decimal::ZERO) < paid.due_amount {
        debug!(
            loan_id = loan.id,
            installment = paid.number,
            due = %paid.due_amount,
            paid = %request.amount,
            "partial payment recorded"
        );
    }
    info!(
        loan_id = loan.id,
        installment = paid.number,
        amount = %payment.amount,
        payment_id = payment.id,
        "payment recorded"
    );

    let payments = store.payments(loan.id)?;
    let remaining = reconcile(&installments, &payments, request.date).total_outstanding;
    let client = store.client(&loan.client_national_id)?;

    Ok(PaymentReceipt {
        receipt_number: payment.id,
        issued_at: recorded_at,
        client_name: client
            .as_ref()
            .map(Client::full_name)
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
        client_national_id: loan.client_national_id.clone(),
        client_phone: client.and_then(|c| c.phone),
        loan_id: loan.id,
        principal: loan.terms.principal,
        installment_number: paid.number,
        installment_due: paid.due_amount,
        amount_paid: payment.amount,
        payment_date: payment.date,
        remaining_balance: remaining,
        loan_status: loan.status,
    })
}

/// The reconciled plan of one loan as of `today`.
pub fn loan_plan<S: LedgerStore>(
    store: &S,
    loan_id: RecordId,
    today: NaiveDate,
) -> CreditisResult<LoanPlan> {
    let loan = store
        .loan(loan_id)?
        .ok_or(CreditisError::LoanNotFound(loan_id))?;
    let installments = store.installments(loan_id)?;
    let payments = store.payments(loan_id)?;

    Ok(LoanPlan {
        client_name: client_name(store, &loan.client_national_id)?,
        schedule: reconcile(&installments, &payments, today),
        loan,
    })
}

pub fn list_loans<S: LedgerStore>(store: &S) -> CreditisResult<Vec<LoanSummary>> {
    store
        .loans()?
        .into_iter()
        .map(|loan| -> CreditisResult<LoanSummary> {
            Ok(LoanSummary {
                loan_id: loan.id,
                client_name: client_name(store, &loan.client_national_id)?,
                client_national_id: loan.client_national_id,
                principal: loan.terms.principal,
                installment_amount: loan.installment_amount,
                term_months: loan.terms.term_months,
                status: loan.status,
            })
        })
        .collect()
}

/// Cancel an active loan. Its installment set is removed as a whole;
/// payments already recorded stay as history.
pub fn cancel_loan<S: LedgerStore>(store: &mut S, loan_id: RecordId) -> CreditisResult<Loan> {
    let mut loan = active_loan(store, loan_id)?;

    store.remove_installments(loan.id)?;
    loan.status = LoanStatus::Cancelled;
    store.update_loan(&loan)?;

    info!(loan_id = loan.id, "loan cancelled");
    Ok(loan)
}

/// Portfolio totals as of `today`. Amounts saturate at `Decimal::MAX`.
pub fn dashboard<S: LedgerStore>(store: &S, today: NaiveDate) -> CreditisResult<Dashboard> {
    let mut board = Dashboard {
        client_count: store.clients()?.len() as u32,
        ..Dashboard::default()
    };

    for loan in store.loans()? {
        let payments: Vec<Payment> = store.payments(loan.id)?;
        board.amount_collected = payments
            .iter()
            .fold(board.amount_collected, |acc, p| acc.saturating_add(p.amount));

        match loan.status {
            LoanStatus::Cancelled => {
                board.cancelled_loans += 1;
                continue;
            }
            LoanStatus::Settled => board.settled_loans += 1,
            LoanStatus::Active => board.active_loans += 1,
        }
        board.principal_lent = board.principal_lent.saturating_add(loan.terms.principal);

        let view = reconcile(&store.installments(loan.id)?, &payments, today);
        board.amount_outstanding = board.amount_outstanding.saturating_add(view.total_outstanding);
        board.overdue_installments += view.overdue_count;
        board.overdue_amount = board.overdue_amount.saturating_add(view.overdue_amount);
    }

    Ok(board)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn active_loan<S: LedgerStore>(store: &S, loan_id: RecordId) -> CreditisResult<Loan> {
    let loan = store
        .loan(loan_id)?
        .ok_or(CreditisError::LoanNotFound(loan_id))?;
    if loan.status != LoanStatus::Active {
        return Err(CreditisError::LoanNotActive {
            loan_id,
            status: loan.status.to_string(),
        });
    }
    Ok(loan)
}

fn client_name<S: LedgerStore>(store: &S, national_id: &str) -> CreditisResult<String> {
    Ok(store
        .client(national_id)?
        .map(|c| c.full_name())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_client(input: &ClientInput) -> CreditisResult<()> {
    if input.national_id.is_empty() {
        return Err(CreditisError::InvalidInput {
            field: "national_id".into(),
            reason: "National id is required.".into(),
        });
    }
    if input.first_names.is_empty() {
        return Err(CreditisError::InvalidInput {
            field: "first_names".into(),
            reason: "First names are required.".into(),
        });
    }
    if input.last_names.is_empty() {
        return Err(CreditisError::InvalidInput {
            field: "last_names".into(),
            reason: "Last names are required.".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
