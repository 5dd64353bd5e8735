use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use creditis_core::lending::amortization::{self, AmortizationInput};
use creditis_core::lending::schedule;
use creditis_core::lending::LoanTerms;

use super::FrequencyArg;
use crate::input;

/// Arguments for the monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount lent
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly interest rate in percent (2 = 2% per month)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub term: Option<u32>,
}

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML loan terms file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount lent
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub term: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment: Option<NaiveDate>,

    /// Disbursement date (defaults to the first payment date)
    #[arg(long)]
    pub disbursement: Option<NaiveDate>,

    /// Payment frequency label
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        data
    } else {
        AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
        }
    };

    let result = amortization::calculate_amortization(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        data
    } else {
        terms_from_flags(
            args.principal,
            args.rate,
            args.term,
            args.first_payment,
            args.disbursement,
            args.frequency,
        )?
    };

    let result = schedule::build_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}

/// Assemble loan terms from individual flags.
pub(crate) fn terms_from_flags(
    principal: Option<Decimal>,
    rate: Option<Decimal>,
    term: Option<u32>,
    first_payment: Option<NaiveDate>,
    disbursement: Option<NaiveDate>,
    frequency: FrequencyArg,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    let first_payment_date =
        first_payment.ok_or("--first-payment is required (or provide --input)")?;
    Ok(LoanTerms {
        principal: principal.ok_or("--principal is required (or provide --input)")?,
        monthly_rate_pct: rate.ok_or("--rate is required (or provide --input)")?,
        term_months: term.ok_or("--term is required (or provide --input)")?,
        payment_frequency: frequency.into(),
        disbursement_date: disbursement.unwrap_or(first_payment_date),
        first_payment_date,
    })
}
