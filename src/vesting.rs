//! Linear vesting math for payment streams.
//!
//! All functions are pure and side-effect free; callers pass the ledger
//! timestamp explicitly so views and tests evaluate against the same clock.

use crate::types::Stream;

/// Total amount vested to the recipient at `now`, before accounting for
/// withdrawals or refunds.
///
/// - Before `start_time`: 0.
/// - From `stop_time` on: `deposit` (vesting is complete).
/// - In between: `elapsed * rate_per_second`, capped at `deposit`.
///
/// The product cannot exceed `deposit` for a rate derived by floor division
/// at creation; the checked multiply guards the cap all the same.
pub fn vested_amount(
    start_time: u64,
    stop_time: u64,
    rate_per_second: i128,
    deposit: i128,
    now: u64,
) -> i128 {
    if now <= start_time {
        return 0;
    }
    if now >= stop_time {
        return deposit;
    }
    let elapsed = (now - start_time) as i128;
    match elapsed.checked_mul(rate_per_second) {
        Some(vested) if vested < deposit => vested,
        _ => deposit,
    }
}

/// The amount the recipient could withdraw from `stream` at `now`.
///
/// Zero for inactive streams and before `start_time`; the full
/// `remaining_balance` from `stop_time` on. In between, the vested amount
/// less everything already consumed (withdrawn or refunded), floored at
/// zero: heavy refunds can consume funds faster than they vest.
pub fn withdrawable(stream: &Stream, now: u64) -> i128 {
    if !stream.is_active || now < stream.start_time {
        return 0;
    }
    if now >= stream.stop_time {
        return stream.remaining_balance;
    }
    let vested = vested_amount(
        stream.start_time,
        stream.stop_time,
        stream.rate_per_second,
        stream.deposit,
        now,
    );
    let consumed = stream.deposit - stream.remaining_balance;
    let available = vested - consumed;
    if available > 0 {
        available
    } else {
        0
    }
}
