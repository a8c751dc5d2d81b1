use serde::{Deserialize, Serialize};

use super::money::{Amount, Currency};

/// The kind of instrument behind a funding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    PrimaryFiat,
    Bank,
    CreditCard,
    RewardsBalance,
}

impl SourceKind {
    pub fn is_rewards(self) -> bool {
        matches!(self, SourceKind::RewardsBalance)
    }
}

/// Represents a wallet-like account a payment can draw from.
///
/// `available` is a snapshot of the spendable balance at read time. Allocation
/// plans never mutate it; the host debits after a plan is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingSource {
    pub id: String,
    pub kind: SourceKind,
    pub currency: Currency,
    pub available: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_kind_serde_kebab_case() {
        let json = serde_json::to_string(&SourceKind::CreditCard).unwrap();
        assert_eq!(json, "\"credit-card\"");
        let parsed: SourceKind = serde_json::from_str("\"rewards-balance\"").unwrap();
        assert_eq!(parsed, SourceKind::RewardsBalance);
    }

    #[test]
    fn test_rewards_kind() {
        assert!(SourceKind::RewardsBalance.is_rewards());
        assert!(!SourceKind::Bank.is_rewards());
        assert!(!SourceKind::PrimaryFiat.is_rewards());
    }

    #[test]
    fn test_funding_source_round_trip() {
        let source = FundingSource {
            id: "src-1".to_string(),
            kind: SourceKind::Bank,
            currency: Currency::Usd,
            available: Amount::new(dec!(200)).unwrap(),
        };
        let json = serde_json::to_string(&source).unwrap();
        let parsed: FundingSource = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, source);
    }
}
