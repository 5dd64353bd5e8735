pub mod amortization;
pub mod reconcile;
pub mod records;
pub mod schedule;

pub use amortization::{calculate_amortization, monthly_payment};
pub use reconcile::{apply_payment, check_single_loan, reconcile};
pub use records::{LoanTerms, Payment, PaymentFrequency, MAX_PRINCIPAL, MAX_TERM_MONTHS};
pub use schedule::{
    build_schedule, generate_schedule, try_generate_schedule, Installment, InstallmentStatus,
};
