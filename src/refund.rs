//! Breach refund calculation.
//!
//! Pure functions mapping a breach severity to a refund tier and amount.
//! The ledger applies the result; nothing here touches storage.

use crate::types::{RefundMode, RefundTiers};

pub const BPS_DENOMINATOR: i128 = 10_000;

/// Tier number reported for flat-percentage (legacy) refunds.
pub const LEGACY_TIER: u32 = 0;

/// Compute the refund owed for a breach of the given severity.
///
/// Legacy mode refunds a flat `refund_percent_on_breach` of the deposit and
/// reports tier 0. Tiered mode picks the tier by severity, boundary values
/// belonging to the higher tier. The result is clamped to
/// `remaining_balance`: a stream never refunds more than it has left.
pub fn calculate_refund(
    deposit: i128,
    remaining_balance: i128,
    refund_percent_on_breach: u32,
    mode: &RefundMode,
    breach_value: u64,
) -> (i128, u32) {
    let (percent, tier) = match mode {
        RefundMode::Legacy => (refund_percent_on_breach, LEGACY_TIER),
        RefundMode::Tiered(tiers) => classify(tiers, breach_value),
    };
    let amount = apply_bps(deposit, percent);
    (amount.min(remaining_balance), tier)
}

fn classify(tiers: &RefundTiers, breach_value: u64) -> (u32, u32) {
    if breach_value >= tiers.tier2_threshold {
        (tiers.tier3_percent, 3)
    } else if breach_value >= tiers.tier1_threshold {
        (tiers.tier2_percent, 2)
    } else {
        (tiers.tier1_percent, 1)
    }
}

fn apply_bps(amount: i128, bps: u32) -> i128 {
    match amount.checked_mul(bps as i128) {
        Some(product) => product / BPS_DENOMINATOR,
        // Deposits large enough to overflow the product divide first,
        // trading at most one basis-point rounding step.
        None => (amount / BPS_DENOMINATOR) * bps as i128,
    }
}
