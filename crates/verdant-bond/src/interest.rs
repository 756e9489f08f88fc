//! Interest accrual engine
//!
//! Pure functions shared by every claim and redemption path. All divisions
//! floor toward zero; the per-basis-point division happens before the
//! quantity/elapsed multiplication, and the seconds-per-year division
//! happens last so that a holder who waits exactly one year collects
//! exactly the annual coupon (no per-second dust loss).
//!
//! A fixed 365-day year is used with no leap-year adjustment - changing
//! this changes observable payouts.

use verdant_core::types::{Amount, Bps, Timestamp, BPS_DENOMINATOR, SECONDS_PER_YEAR};

/// Coupon owed on `quantity` units of `face_value` at `rate_bps` over a
/// window of `window_secs` seconds.
pub fn coupon_for_window(
    rate_bps: Bps,
    face_value: Amount,
    quantity: Amount,
    window_secs: u64,
) -> Amount {
    let annual_per_unit = face_value * rate_bps as Amount / BPS_DENOMINATOR as Amount;
    annual_per_unit * quantity * window_secs as Amount / SECONDS_PER_YEAR as Amount
}

/// Accrued coupon since the holder's last claim.
///
/// Returns 0 when the holder has no units, has never purchased
/// (`last_claim == 0`), or no time has elapsed.
pub fn accrue(
    last_claim: Timestamp,
    rate_bps: Bps,
    face_value: Amount,
    quantity: Amount,
    now: Timestamp,
) -> Amount {
    if quantity == 0 || last_claim == 0 || now <= last_claim {
        return 0;
    }
    coupon_for_window(rate_bps, face_value, quantity, (now - last_claim) as u64)
}
