use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use creditis_core::lending::reconcile::ReconciledSchedule;
use creditis_core::lending::{self, Installment, Payment};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    let input: lending::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending::calculate_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let terms: lending::LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending::build_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Installments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ApplyPaymentInput {
    schedule: Vec<Installment>,
    installment_number: u32,
    paid_amount: Decimal,
    paid_date: NaiveDate,
}

#[derive(Serialize)]
struct ApplyPaymentOutput {
    installment: Installment,
    schedule: Vec<Installment>,
}

/// Returns the paid installment and the updated schedule; the caller's
/// copy is never touched.
#[napi]
pub fn apply_payment(input_json: String) -> NapiResult<String> {
    let mut input: ApplyPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let installment = lending::apply_payment(
        &mut input.schedule,
        input.installment_number,
        input.paid_amount,
        input.paid_date,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&ApplyPaymentOutput {
        installment,
        schedule: input.schedule,
    })
    .map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ReconcileInput {
    schedule: Vec<Installment>,
    #[serde(default)]
    payments: Vec<Payment>,
    today: NaiveDate,
}

#[napi]
pub fn reconcile_schedule(input_json: String) -> NapiResult<String> {
    let input: ReconcileInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    lending::check_single_loan(&input.payments).map_err(to_napi_error)?;
    let view: ReconciledSchedule =
        lending::reconcile(&input.schedule, &input.payments, input.today);
    serde_json::to_string(&view).map_err(to_napi_error)
}
