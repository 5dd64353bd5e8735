use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use creditis_core::ledger::{
    self, ClientInput, LedgerStore, LoanApplication, LoanStatus, PaymentRequest,
};
use creditis_core::CreditisError;

use super::lending::terms_from_flags;
use super::{today, FrequencyArg};
use crate::input;
use crate::store::JsonFileStore;

/// Arguments for registering a client
#[derive(Args)]
pub struct AddClientArgs {
    /// National identity document number
    #[arg(long)]
    pub national_id: String,

    #[arg(long)]
    pub first_names: String,

    #[arg(long)]
    pub last_names: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

/// Arguments for registering a loan
#[derive(Args)]
pub struct AddLoanArgs {
    /// National id of the borrowing client
    #[arg(long)]
    pub client: String,

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

    /// Disbursement date (defaults to today)
    #[arg(long)]
    pub disbursement: Option<NaiveDate>,

    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Loan id
    #[arg(long)]
    pub loan: u64,

    /// Date overdue status is judged against (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Arguments for recording a payment
#[derive(Args)]
pub struct PayArgs {
    /// Loan id
    #[arg(long)]
    pub loan: u64,

    /// Installment number, starting at 1
    #[arg(long)]
    pub installment: u32,

    /// Amount received (defaults to the installment's due amount)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Payment date (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct CancelLoanArgs {
    /// Loan id
    #[arg(long)]
    pub loan: u64,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Date overdue status is judged against (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

pub fn run_add_client(
    args: AddClientArgs,
    store_path: &Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileStore::open(store_path)?;
    let client = ledger::register_client(
        store.ledger_mut(),
        ClientInput {
            national_id: args.national_id,
            first_names: args.first_names,
            last_names: args.last_names,
            phone: args.phone,
            address: args.address,
        },
    )?;
    store.save()?;
    Ok(serde_json::to_value(client)?)
}

pub fn run_add_loan(
    args: AddLoanArgs,
    store_path: &Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else {
        terms_from_flags(
            args.principal,
            args.rate,
            args.term,
            args.first_payment,
            Some(args.disbursement.unwrap_or_else(today)),
            args.frequency,
        )?
    };

    let mut store = JsonFileStore::open(store_path)?;
    let plan = ledger::register_loan(
        store.ledger_mut(),
        LoanApplication {
            client_national_id: args.client,
            terms,
        },
        now(),
    )?;
    store.save()?;
    Ok(serde_json::to_value(plan)?)
}

pub fn run_loans(store_path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let store = JsonFileStore::open(store_path)?;
    let loans = ledger::list_loans(store.ledger())?;
    Ok(serde_json::to_value(loans)?)
}

pub fn run_plan(args: PlanArgs, store_path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let store = JsonFileStore::open(store_path)?;
    let plan = ledger::loan_plan(store.ledger(), args.loan, args.today.unwrap_or_else(today))?;
    Ok(serde_json::to_value(plan)?)
}

pub fn run_pay(args: PayArgs, store_path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileStore::open(store_path)?;

    let amount = match args.amount {
        Some(amount) => amount,
        None => due_amount(store.ledger(), args.loan, args.installment)?,
    };

    let receipt = ledger::record_payment(
        store.ledger_mut(),
        PaymentRequest {
            loan_id: args.loan,
            installment_number: args.installment,
            amount,
            date: args.date.unwrap_or_else(today),
        },
        now(),
    )?;
    store.save()?;
    Ok(serde_json::to_value(receipt)?)
}

pub fn run_cancel_loan(
    args: CancelLoanArgs,
    store_path: &Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileStore::open(store_path)?;
    let loan = ledger::cancel_loan(store.ledger_mut(), args.loan)?;
    store.save()?;
    Ok(serde_json::to_value(loan)?)
}

pub fn run_dashboard(
    args: DashboardArgs,
    store_path: &Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store = JsonFileStore::open(store_path)?;
    let board = ledger::dashboard(store.ledger(), args.today.unwrap_or_else(today))?;
    Ok(serde_json::to_value(board)?)
}

/// Due amount of an installment of an active loan.
fn due_amount<S: LedgerStore>(
    store: &S,
    loan_id: u64,
    installment_number: u32,
) -> Result<Decimal, CreditisError> {
    let loan = store
        .loan(loan_id)?
        .ok_or(CreditisError::LoanNotFound(loan_id))?;
    if loan.status != LoanStatus::Active {
        return Err(CreditisError::LoanNotActive {
            loan_id,
            status: loan.status.to_string(),
        });
    }
    store
        .installments(loan_id)?
        .iter()
        .find(|i| i.number == installment_number)
        .map(|i| i.due_amount)
        .ok_or(CreditisError::InstallmentNotFound {
            number: installment_number,
        })
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
