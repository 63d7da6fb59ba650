use serde_json::json;

use super::HttpApi;
use crate::error::{AppError, Result};
use crate::models::{BankDestination, Institution, VerifiedAccount};

impl HttpApi {
    pub async fn fetch_institutions(&self) -> Result<Vec<Institution>> {
        self.get_json("banks/institutions", &[], "institution listing")
            .await
    }

    /// Resolve the account holder's name for a bank code + account number.
    /// A missing account is a distinct failure from an API outage; the two
    /// get different guidance text upstream.
    pub async fn verify_bank_account(
        &self,
        bank_code: &str,
        account_number: &str,
    ) -> Result<VerifiedAccount> {
        let result: Result<VerifiedAccount> = self
            .post_json(
                "banks/verify-account",
                &json!({
                    "bankCode": bank_code,
                    "accountNumber": account_number,
                }),
                "account verification",
            )
            .await;

        result.map_err(|e| match e {
            AppError::ExternalAPI(msg) if is_not_found_message(&msg) => AppError::AccountNotFound,
            AppError::ExternalAPI(msg) => AppError::BankVerification(msg),
            other => other,
        })
    }

    /// Previously verified payout destination for the authenticated user,
    /// if one exists. Absence is not an error here; the bank gate decides
    /// what to do about it.
    pub async fn fetch_bank_details(&self) -> Result<Option<BankDestination>> {
        match self
            .get_json::<BankDestination>("banks/details", &[], "bank details")
            .await
        {
            Ok(details) => Ok(Some(details)),
            Err(AppError::ExternalAPI(msg)) if is_not_found_message(&msg) => Ok(None),
            Err(AppError::ExternalAPI(msg)) if msg.contains("empty response body") => Ok(None),
            Err(other) => Err(other),
        }
    }
}

fn is_not_found_message(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("not found") || lowered.contains("404")
}
