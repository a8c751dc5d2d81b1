use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};
use super::money::{Amount, Currency};

/// Subscription tier of the paying customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayerTier {
    #[default]
    Standard,
    Premium,
}

impl PayerTier {
    pub fn waives_service_fee(self) -> bool {
        matches!(self, PayerTier::Premium)
    }
}

/// The fee schedule applied to checkout amounts.
///
/// The floor and cap apply only when the computed fee is positive: a zero base
/// amount is never charged up to the minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    /// Percentage of the base amount, e.g. `10` for 10%.
    pub service_fee_percent: Decimal,
    /// A positive fee below this floor is raised to it.
    pub minimum_fee: Decimal,
    /// A fee above this cap is lowered to it.
    pub maximum_fee: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            service_fee_percent: dec!(10),
            minimum_fee: dec!(1.00),
            maximum_fee: dec!(50.00),
        }
    }
}

/// Represents the fee-adjusted view of a checkout amount.
///
/// A quote is derived, never stored: recomputing from the same inputs yields
/// the same quote, and `total` always equals `base_amount + service_fee_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub base_amount: Amount,
    pub currency: Currency,
    pub service_fee_percent: Decimal,
    /// The fee actually added to the total; zero when waived.
    pub service_fee_amount: Amount,
    /// The fee before any waiver, kept so callers can show what was saved.
    pub original_fee: Amount,
    pub waived: bool,
    pub total: Amount,
}

/// Computes the service fee and total due for a base amount.
///
/// The fee is `base * percent`, floored and capped by the policy, then rounded
/// to cents. Premium payers have the fee waived; `original_fee` still carries
/// the pre-waiver value. A zero base short-circuits to an all-zero quote with
/// `waived == false` since there was nothing to waive. A base large enough to
/// overflow the fee math is rejected as `InvalidAmount`.
pub fn quote_fee(
    base_amount: Decimal,
    currency: Currency,
    tier: PayerTier,
    policy: &FeePolicy,
) -> Result<FeeQuote> {
    let base = Amount::new(base_amount)?;

    if base.is_zero() {
        return Ok(FeeQuote {
            base_amount: base,
            currency,
            service_fee_percent: policy.service_fee_percent,
            service_fee_amount: Amount::ZERO,
            original_fee: Amount::ZERO,
            waived: false,
            total: base,
        });
    }

    let mut fee = base
        .value()
        .checked_mul(policy.service_fee_percent)
        .and_then(|fee| fee.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(SettlementError::InvalidAmount(base_amount))?;
    if fee > Decimal::ZERO {
        if fee < policy.minimum_fee {
            fee = policy.minimum_fee;
        }
        if fee > policy.maximum_fee {
            fee = policy.maximum_fee;
        }
    }
    let original_fee = Amount::new(fee)?.round_cents();

    let waived = tier.waives_service_fee();
    let service_fee_amount = if waived { Amount::ZERO } else { original_fee };
    let total = base
        .value()
        .checked_add(service_fee_amount.value())
        .ok_or(SettlementError::InvalidAmount(base_amount))?;

    Ok(FeeQuote {
        base_amount: base,
        currency,
        service_fee_percent: policy.service_fee_percent,
        service_fee_amount,
        original_fee,
        waived,
        total: Amount::new(total)?,
    })
}
