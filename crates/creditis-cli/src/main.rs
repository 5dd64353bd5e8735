mod commands;
mod input;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::ledger::{
    AddClientArgs, AddLoanArgs, CancelLoanArgs, DashboardArgs, PayArgs, PlanArgs,
};
use commands::lending::{PaymentArgs, ScheduleArgs};

/// Loan tracking: amortization, installment plans and payments
#[derive(Parser)]
#[command(
    name = "creditis",
    version,
    about = "Loan tracking: amortization, installment plans and payments",
    long_about = "A CLI for registering clients and loans, generating French-amortization \
                  installment plans with decimal precision, recording payments against \
                  installments and reviewing the loan portfolio."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Ledger file holding clients, loans, installments and payments
    #[arg(long, env = "CREDITIS_STORE", default_value = "creditis.json", global = true)]
    store: PathBuf,

    /// Log ledger activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the level monthly installment of a loan
    Payment(PaymentArgs),
    /// Generate an installment schedule without saving it
    Schedule(ScheduleArgs),
    /// Register a client (or update one with the same national id)
    AddClient(AddClientArgs),
    /// Register a loan and its installment plan
    AddLoan(AddLoanArgs),
    /// List every loan in the ledger
    Loans,
    /// Show the installment plan of a loan
    Plan(PlanArgs),
    /// Record a payment against an installment and print the receipt
    Pay(PayArgs),
    /// Cancel an active loan and drop its installment plan
    CancelLoan(CancelLoanArgs),
    /// Portfolio totals
    Dashboard(DashboardArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "creditis=debug,creditis_core=debug"
    } else {
        "creditis=warn,creditis_core=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::lending::run_payment(args),
        Commands::Schedule(args) => commands::lending::run_schedule(args),
        Commands::AddClient(args) => commands::ledger::run_add_client(args, &cli.store),
        Commands::AddLoan(args) => commands::ledger::run_add_loan(args, &cli.store),
        Commands::Loans => commands::ledger::run_loans(&cli.store),
        Commands::Plan(args) => commands::ledger::run_plan(args, &cli.store),
        Commands::Pay(args) => commands::ledger::run_pay(args, &cli.store),
        Commands::CancelLoan(args) => commands::ledger::run_cancel_loan(args, &cli.store),
        Commands::Dashboard(args) => commands::ledger::run_dashboard(args, &cli.store),
        Commands::Version => {
            println!("creditis {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
