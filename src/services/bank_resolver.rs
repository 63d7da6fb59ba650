use std::sync::Arc;

use crate::api::AbokiApi;
use crate::constants::NUBAN_ACCOUNT_DIGITS;
use crate::error::{AppError, Result};
use crate::models::{BankDestination, Institution};

/// Outcome of the pre-settlement bank gate.
#[derive(Debug, Clone)]
pub enum BankGate {
    Ready(BankDestination),
    /// No usable destination on file; the swap pauses while the user runs
    /// the verification sub-flow.
    VerificationRequired,
}

/// Guarantees a verified bank destination exists before settlement.
pub struct BankDestinationResolver {
    api: Arc<dyn AbokiApi>,
    cached: Option<BankDestination>,
}

impl BankDestinationResolver {
    pub fn new(api: Arc<dyn AbokiApi>) -> Self {
        Self { api, cached: None }
    }

    /// Resolve a settlement-ready destination, preferring one the intent
    /// already carries, then the session cache, then the remote API.
    pub async fn resolve(&mut self, from_intent: Option<&BankDestination>) -> Result<BankGate> {
        if let Some(dest) = from_intent {
            if dest.is_settlement_ready() {
                return Ok(BankGate::Ready(dest.clone()));
            }
        }
        if let Some(dest) = &self.cached {
            if dest.is_settlement_ready() {
                return Ok(BankGate::Ready(dest.clone()));
            }
        }

        match self.api.bank_details().await? {
            Some(dest) if dest.is_settlement_ready() => {
                self.cached = Some(dest.clone());
                Ok(BankGate::Ready(dest))
            }
            _ => Ok(BankGate::VerificationRequired),
        }
    }

    pub async fn institutions(&self) -> Result<Vec<Institution>> {
        self.api.list_institutions().await
    }

    /// Remote account-name lookup. Callers trigger this automatically once
    /// the account number reaches the expected digit count.
    pub async fn verify(
        &mut self,
        institution: &Institution,
        account_number: &str,
    ) -> Result<BankDestination> {
        let digits = account_number.trim();
        if !is_complete_account_number(digits) {
            return Err(AppError::BadRequest(format!(
                "Account number must be {} digits",
                NUBAN_ACCOUNT_DIGITS
            )));
        }

        // AccountNotFound and BankVerification surface separately; the two
        // get different guidance text and neither is auto-retried.
        let verified = self.api.verify_account(&institution.code, digits).await?;

        let destination = BankDestination {
            account_name: verified.account_name,
            account_number: verified.account_number,
            bank_name: institution.name.clone(),
            bank_code: verified.bank_code,
            country: institution.country.clone(),
            account_type: "bank".to_string(),
        };
        self.cached = Some(destination.clone());
        Ok(destination)
    }

    pub fn cached(&self) -> Option<&BankDestination> {
        self.cached.as_ref()
    }
}

/// True once an entry reaches the NUBAN length with digits only; this is
/// the auto-verification trigger.
pub fn is_complete_account_number(entry: &str) -> bool {
    entry.len() == NUBAN_ACCOUNT_DIGITS && entry.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{ready_destination, MockApi};
    use std::sync::atomic::Ordering;

    fn institution() -> Institution {
        Institution {
            name: "GTBank".to_string(),
            code: "058".to_string(),
            country: "NG".to_string(),
        }
    }

    #[test]
    fn account_number_completion_trigger() {
        assert!(is_complete_account_number("0123456789"));
        assert!(!is_complete_account_number("012345678"));
        assert!(!is_complete_account_number("01234567890"));
        assert!(!is_complete_account_number("01234abcde"));
    }

    #[tokio::test]
    async fn existing_details_pass_the_gate() {
        let api = Arc::new(MockApi::new());
        let mut resolver = BankDestinationResolver::new(api);
        match resolver.resolve(None).await.unwrap() {
            BankGate::Ready(dest) => assert_eq!(dest.bank_code, "058"),
            BankGate::VerificationRequired => panic!("expected ready destination"),
        }
    }

    #[tokio::test]
    async fn missing_details_require_verification() {
        let api = Arc::new(MockApi::new().without_bank_details());
        let mut resolver = BankDestinationResolver::new(api);
        assert!(matches!(
            resolver.resolve(None).await.unwrap(),
            BankGate::VerificationRequired
        ));
    }

    #[tokio::test]
    async fn incomplete_details_require_verification() {
        let api = Arc::new(MockApi::new());
        *api.bank.lock().unwrap() = Some(BankDestination {
            bank_code: String::new(),
            ..ready_destination()
        });
        let mut resolver = BankDestinationResolver::new(api);
        assert!(matches!(
            resolver.resolve(None).await.unwrap(),
            BankGate::VerificationRequired
        ));
    }

    #[tokio::test]
    async fn verification_caches_the_destination() {
        let api = Arc::new(MockApi::new().without_bank_details());
        let mut resolver = BankDestinationResolver::new(api.clone());

        let dest = resolver
            .verify(&institution(), "0123456789")
            .await
            .unwrap();
        assert_eq!(dest.account_name, "Ada Obi");
        assert!(dest.is_settlement_ready());

        // The gate now passes from cache without another remote fetch.
        assert!(matches!(
            resolver.resolve(None).await.unwrap(),
            BankGate::Ready(_)
        ));
        assert_eq!(api.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_account_number_is_rejected_locally() {
        let api = Arc::new(MockApi::new());
        let mut resolver = BankDestinationResolver::new(api.clone());
        let err = resolver.verify(&institution(), "01234").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(api.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn account_not_found_is_distinct_from_generic_failure() {
        let api = Arc::new(MockApi::new());
        *api.verify_fails_with_not_found.lock().unwrap() = true;
        let mut resolver = BankDestinationResolver::new(api);
        let err = resolver
            .verify(&institution(), "0123456789")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }
}
