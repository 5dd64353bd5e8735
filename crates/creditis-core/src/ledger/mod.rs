//! Clients, loans and payments over an explicitly passed store.
//!
//! The lending core stays pure; everything here composes it with a
//! [`LedgerStore`] handed in by the caller.

pub mod records;
pub mod service;
pub mod store;

pub use records::{Client, ClientInput, Loan, LoanApplication, LoanStatus, PaymentRequest};
pub use service::{
    cancel_loan, dashboard, list_loans, loan_plan, record_payment, register_client,
    register_loan, Dashboard, LoanPlan, LoanSummary, PaymentReceipt,
};
pub use store::{LedgerStore, MemoryStore};
