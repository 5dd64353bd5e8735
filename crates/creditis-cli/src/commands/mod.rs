pub mod ledger;
pub mod lending;

use chrono::NaiveDate;
use clap::ValueEnum;

use creditis_core::lending::PaymentFrequency;

/// Payment frequency as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => PaymentFrequency::Daily,
            FrequencyArg::Weekly => PaymentFrequency::Weekly,
            FrequencyArg::Biweekly => PaymentFrequency::Biweekly,
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
        }
    }
}

/// The operator's calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
