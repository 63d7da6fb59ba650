use serde::{Deserialize, Serialize};

/// Verified payout destination. Settlement submission requires a non-empty
/// bank code; anything less diverts the flow into verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDestination {
    #[serde(rename = "accountName")]
    pub account_name: String,
    #[serde(rename = "accountNumber")]
    pub account_number: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "bankCode", default)]
    pub bank_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "accountType", default)]
    pub account_type: String,
}

impl BankDestination {
    /// Complete enough to submit a settlement against.
    pub fn is_settlement_ready(&self) -> bool {
        !self.bank_code.trim().is_empty() && !self.account_number.trim().is_empty()
    }
}

/// Entry from the bank-institution listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub country: String,
}

/// Result of a successful account-name lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedAccount {
    #[serde(rename = "accountName")]
    pub account_name: String,
    #[serde(rename = "accountNumber")]
    pub account_number: String,
    #[serde(rename = "bankCode")]
    pub bank_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_without_bank_code_is_not_ready() {
        let dest = BankDestination {
            account_name: "Ada Obi".to_string(),
            account_number: "0123456789".to_string(),
            bank_name: "GTBank".to_string(),
            bank_code: String::new(),
            country: "NG".to_string(),
            account_type: "savings".to_string(),
        };
        assert!(!dest.is_settlement_ready());

        let ready = BankDestination {
            bank_code: "058".to_string(),
            ..dest
        };
        assert!(ready.is_settlement_ready());
    }
}
