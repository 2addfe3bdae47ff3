//! Market valuation averaging.
//!
//! The estimated resale value is the arithmetic mean of the third-party
//! valuations the user has filled in. Entries at zero or below are treated
//! as "not provided" and excluded; when nothing positive exists the mean is
//! `None` so the sheet renders blank rather than `0,00 €`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

/// Mean of the strictly-positive valuation entries, `None` when there are
/// none.
pub fn media_positivas(valoraciones: &BTreeMap<String, Decimal>) -> Option<Decimal> {
    let mut total = Decimal::ZERO;
    let mut count = 0u32;
    for valor in valoraciones.values() {
        if *valor > Decimal::ZERO {
            total += *valor;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(round_half_up(total / Decimal::from(count)))
    }
}
