//! Coin packages sold for real money.
//!
//! | price (USD) | coins |
//! |-------------|-------|
//! | 1           | 100   |
//! | 5           | 500   |
//! | anything else | 1000 |

use crate::models::Amount;

pub const STARTER_PACK_COINS: i64 = 100;
pub const VALUE_PACK_COINS: i64 = 500;
pub const PREMIUM_PACK_COINS: i64 = 1000;

/// Coins granted for a top-up of `amount` dollars.
///
/// The starter pack matches on the integer the amount starts with, the value
/// pack only on exactly five dollars. Missing or unreadable amounts fall
/// through to the premium pack.
pub fn coins_for_amount(amount: Option<&Amount>) -> i64 {
    match amount {
        Some(amount) if amount.leading_integer() == Some(1) => STARTER_PACK_COINS,
        Some(amount) if amount.value() == Some(5.0) => VALUE_PACK_COINS,
        _ => PREMIUM_PACK_COINS,
    }
}

/// Price in the smallest currency unit, as sent to the payment gateway.
pub fn amount_in_cents(price: f64) -> Option<u64> {
    let cents = (price * 100.0).round();
    (cents.is_finite() && cents >= 1.0).then_some(cents as u64)
}
