use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::records::{Client, ClientInput, Loan, PaymentRequest};
use crate::lending::records::Payment;
use crate::lending::schedule::Installment;
use crate::{CreditisError, CreditisResult, types::*};

/// Storage collaborator for the ledger.
///
/// Calls are synchronous and run one at a time; implementations need no
/// locking. Nothing here guards against two callers reading the same
/// pending installment and both paying it.
pub trait LedgerStore {
    /// Insert a client, or update the one holding the same national id.
    fn upsert_client(&mut self, input: ClientInput) -> CreditisResult<Client>;
    fn client(&self, national_id: &str) -> CreditisResult<Option<Client>>;
    fn clients(&self) -> CreditisResult<Vec<Client>>;

    /// Reserve the identifier for the next loan.
    fn next_loan_id(&mut self) -> CreditisResult<RecordId>;
    fn insert_loan(&mut self, loan: Loan) -> CreditisResult<()>;
    fn update_loan(&mut self, loan: &Loan) -> CreditisResult<()>;
    fn loan(&self, id: RecordId) -> CreditisResult<Option<Loan>>;
    fn loans(&self) -> CreditisResult<Vec<Loan>>;

    /// Replace the installment set of a loan.
    fn put_installments(&mut self, loan_id: RecordId, installments: Vec<Installment>)
        -> CreditisResult<()>;
    fn installments(&self, loan_id: RecordId) -> CreditisResult<Vec<Installment>>;
    fn remove_installments(&mut self, loan_id: RecordId) -> CreditisResult<()>;

    fn append_payment(
        &mut self,
        request: &PaymentRequest,
        recorded_at: NaiveDateTime,
    ) -> CreditisResult<Payment>;
    fn payments(&self, loan_id: RecordId) -> CreditisResult<Vec<Payment>>;
}

/// In-memory store. Serialisable so a caller can persist the whole ledger
/// as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    loans: BTreeMap<RecordId, Loan>,
    #[serde(default)]
    installments: BTreeMap<RecordId, Vec<Installment>>,
    #[serde(default)]
    payments: Vec<Payment>,
    #[serde(default)]
    last_client_id: RecordId,
    #[serde(default)]
    last_loan_id: RecordId,
    #[serde(default)]
    last_payment_id: RecordId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn upsert_client(&mut self, input: ClientInput) -> CreditisResult<Client> {
        if let Some(existing) = self
            .clients
            .iter_mut()
            .find(|c| c.national_id == input.national_id)
        {
            existing.first_names = input.first_names;
            existing.last_names = input.last_names;
            if input.phone.is_some() {
                existing.phone = input.phone;
            }
            if input.address.is_some() {
                existing.address = input.address;
            }
            return Ok(existing.clone());
        }

        self.last_client_id += 1;
        let client = Client {
            id: self.last_client_id,
            national_id: input.national_id,
            first_names: input.first_names,
            last_names: input.last_names,
            phone: input.phone,
            address: input.address,
        };
        self.clients.push(client.clone());
        Ok(client)
    }

    fn client(&self, national_id: &str) -> CreditisResult<Option<Client>> {
        Ok(self
            .clients
            .iter()
            .find(|c| c.national_id == national_id)
            .cloned())
    }

    fn clients(&self) -> CreditisResult<Vec<Client>> {
        Ok(self.clients.clone())
    }

    fn next_loan_id(&mut self) -> CreditisResult<RecordId> {
        self.last_loan_id += 1;
        Ok(self.last_loan_id)
    }

    fn insert_loan(&mut self, loan: Loan) -> CreditisResult<()> {
        if self.loans.contains_key(&loan.id) {
            return Err(CreditisError::Storage(format!(
                "loan {} already exists",
                loan.id
            )));
        }
        self.last_loan_id = self.last_loan_id.max(loan.id);
        self.loans.insert(loan.id, loan);
        Ok(())
    }

    fn update_loan(&mut self, loan: &Loan) -> CreditisResult<()> {
        match self.loans.get_mut(&loan.id) {
            Some(slot) => {
                *slot = loan.clone();
                Ok(())
            }
            None => Err(CreditisError::LoanNotFound(loan.id)),
        }
    }

    fn loan(&self, id: RecordId) -> CreditisResult<Option<Loan>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn loans(&self) -> CreditisResult<Vec<Loan>> {
        Ok(self.loans.values().cloned().collect())
    }

    fn put_installments(
        &mut self,
        loan_id: RecordId,
        installments: Vec<Installment>,
    ) -> CreditisResult<()> {
        if !self.loans.contains_key(&loan_id) {
            return Err(CreditisError::LoanNotFound(loan_id));
        }
        self.installments.insert(loan_id, installments);
        Ok(())
    }

    fn installments(&self, loan_id: RecordId) -> CreditisResult<Vec<Installment>> {
        Ok(self.installments.get(&loan_id).cloned().unwrap_or_default())
    }

    fn remove_installments(&mut self, loan_id: RecordId) -> CreditisResult<()> {
        self.installments.remove(&loan_id);
        Ok(())
    }

    fn append_payment(
        &mut self,
        request: &PaymentRequest,
        recorded_at: NaiveDateTime,
    ) -> CreditisResult<Payment> {
        self.last_payment_id += 1;
        let payment = Payment {
            id: self.last_payment_id,
            loan_id: request.loan_id,
            installment_number: request.installment_number,
            amount: request.amount,
            date: request.date,
            recorded_at,
        };
        self.payments.push(payment.clone());
        Ok(payment)
    }

    fn payments(&self, loan_id: RecordId) -> CreditisResult<Vec<Payment>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.loan_id == loan_id)
            .cloned()
            .collect())
    }
}
