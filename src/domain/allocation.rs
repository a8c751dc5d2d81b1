use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};
use super::funding::FundingSource;
use super::money::{Amount, Currency};

/// Represents how a payment total is covered across funding sources.
///
/// Rewards are consumed first, then exactly one fiat source covers the rest.
/// `rewards_applied + source_contribution` always equals `total`. Building a
/// plan is a pure computation: no balance is debited until the host accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub currency: Currency,
    pub total: Amount,
    pub rewards_source_id: Option<String>,
    pub rewards_applied: Amount,
    /// The portion rewards left uncovered.
    pub remaining_due: Amount,
    pub chosen_source: Option<FundingSource>,
    pub source_contribution: Amount,
}

impl AllocationPlan {
    pub fn is_fully_covered_by_rewards(&self) -> bool {
        self.remaining_due.is_zero() && self.chosen_source.is_none()
    }
}

/// Fiat sources able to cover the whole remaining amount on their own.
///
/// Rewards balances never appear here; they are consumed up front, not chosen.
pub fn eligible_sources<'a>(
    remaining: Amount,
    currency: Currency,
    candidates: &'a [FundingSource],
) -> Vec<&'a FundingSource> {
    candidates
        .iter()
        .filter(|source| {
            !source.kind.is_rewards() && source.currency == currency && source.available >= remaining
        })
        .collect()
}

/// Plans how `total` is paid: rewards first, then one selected fiat source.
///
/// `rewards_source` participates only when `use_rewards` is set, it really is
/// a rewards balance, and it holds a positive balance; it contributes
/// `min(balance, total)`. Whatever remains must be covered in full by the
/// source named in `selection`, resolved among the fiat candidates and
/// validated for currency and balance. No selection is needed when rewards
/// cover everything.
pub fn allocate(
    total: Amount,
    currency: Currency,
    use_rewards: bool,
    rewards_source: Option<&FundingSource>,
    candidates: &[FundingSource],
    selection: Option<&str>,
) -> Result<AllocationPlan> {
    let rewards = rewards_source
        .filter(|source| use_rewards && source.kind.is_rewards() && !source.available.is_zero());

    let (rewards_applied, rewards_source_id) = match rewards {
        Some(source) => {
            let applied = source.available.min(total);
            if applied.is_zero() {
                (Amount::ZERO, None)
            } else {
                (applied, Some(source.id.clone()))
            }
        }
        None => (Amount::ZERO, None),
    };

    let remaining_due = total.saturating_sub(rewards_applied);

    if remaining_due.is_zero() {
        return Ok(AllocationPlan {
            currency,
            total,
            rewards_source_id,
            rewards_applied,
            remaining_due,
            chosen_source: None,
            source_contribution: Amount::ZERO,
        });
    }

    if eligible_sources(remaining_due, currency, candidates).is_empty() {
        return Err(SettlementError::NoEligibleFunding {
            currency,
            remaining: remaining_due.value(),
        });
    }

    let Some(selected_id) = selection else {
        return Err(SettlementError::MissingFundingSelection {
            currency,
            remaining: remaining_due.value(),
        });
    };

    // Rewards balances are never chosen to cover the remainder, whatever
    // currency they were seeded with.
    let Some(source) = candidates
        .iter()
        .find(|s| s.id == selected_id && !s.kind.is_rewards())
    else {
        return Err(SettlementError::NotFound {
            entity: "funding source",
            id: selected_id.to_string(),
        });
    };

    if source.currency != currency {
        return Err(SettlementError::SourceCurrencyMismatch {
            source_id: source.id.clone(),
            expected: currency,
            found: source.currency,
        });
    }

    if source.available < remaining_due {
        return Err(SettlementError::InsufficientBalance {
            source_id: source.id.clone(),
            available: source.available.value(),
            required: remaining_due.value(),
        });
    }

    Ok(AllocationPlan {
        currency,
        total,
        rewards_source_id,
        rewards_applied,
        remaining_due,
        chosen_source: Some(source.clone()),
        source_contribution: remaining_due,
    })
}
