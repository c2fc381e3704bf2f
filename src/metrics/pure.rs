//! Stateless microstructure metric functions.

use rust_decimal::Decimal;

/// `best_ask - best_bid`, or zero if either side is empty.
pub fn spread(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Decimal {
    match (best_bid, best_ask) {
        (Some(bb), Some(ba)) => ba - bb,
        _ => Decimal::ZERO,
    }
}

/// Arithmetic mean of best bid and ask, or zero if either side is empty.
pub fn mid(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Decimal {
    match (best_bid, best_ask) {
        (Some(bb), Some(ba)) => (bb + ba) / Decimal::TWO,
        _ => Decimal::ZERO,
    }
}

/// Normalized difference of summed top-N bid vs ask volumes, in `[-1, 1]`.
/// Zero if both sides are empty of volume.
pub fn imbalance(top_bid_volume: Decimal, top_ask_volume: Decimal) -> Decimal {
    let total = top_bid_volume + top_ask_volume;
    if total == Decimal::ZERO {
        Decimal::ZERO
    } else {
        (top_bid_volume - top_ask_volume) / total
    }
}

/// Volume-weighted mid using opposite-side quantities. Falls back to `mid`
/// when both top-of-book quantities are zero or a side is empty.
pub fn microprice(
    best_bid: Option<(Decimal, Decimal)>,
    best_ask: Option<(Decimal, Decimal)>,
) -> Decimal {
    match (best_bid, best_ask) {
        (Some((bb, qb)), Some((ba, qa))) => {
            let denom = qb + qa;
            if denom == Decimal::ZERO {
                mid(Some(bb), Some(ba))
            } else {
                (bb * qa + ba * qb) / denom
            }
        }
        (bb, ba) => mid(bb.map(|(p, _)| p), ba.map(|(p, _)| p)),
    }
}

/// Signed per-step Order Flow Imbalance contribution from a top-of-book
/// transition. `None` quantities represent an empty side.
pub fn ofi_step(
    prev_bid: Option<(Decimal, Decimal)>,
    curr_bid: Option<(Decimal, Decimal)>,
    prev_ask: Option<(Decimal, Decimal)>,
    curr_ask: Option<(Decimal, Decimal)>,
) -> Decimal {
    let e_bid = match (prev_bid, curr_bid) {
        (None, None) => Decimal::ZERO,
        (None, Some((_, q_now))) => q_now,
        (Some((_, q_prev)), None) => -q_prev,
        (Some((p_prev, q_prev)), Some((p_now, q_now))) => {
            if p_now > p_prev {
                q_now
            } else if p_now < p_prev {
                -q_prev
            } else {
                q_now - q_prev
            }
        }
    };

    let e_ask = match (prev_ask, curr_ask) {
        (None, None) => Decimal::ZERO,
        (None, Some((_, q_now))) => q_now,
        (Some((_, q_prev)), None) => -q_prev,
        (Some((p_prev, q_prev)), Some((p_now, q_now))) => {
            if p_now < p_prev {
                q_now
            } else if p_now > p_prev {
                -q_prev
            } else {
                q_now - q_prev
            }
        }
    };

    e_bid - e_ask
}

/// VPIN-style flow toxicity estimate over a caller-supplied volume bucket:
/// `|buy_volume - sell_volume| / (buy_volume + sell_volume)`, in `[0, 1]`.
/// Supplemental metric (see `SPEC_FULL.md` §C.1) — not wired into the ladder
/// payload or pipeline state by default.
pub fn vpin(buy_volume: Decimal, sell_volume: Decimal) -> Decimal {
    let total = buy_volume + sell_volume;
    if total == Decimal::ZERO {
        Decimal::ZERO
    } else {
        (buy_volume - sell_volume).abs() / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn microprice_asymmetry_from_spec() {
        let bb = (dec!(100), dec!(9));
        let ba = (dec!(101), dec!(1));
        assert_eq!(microprice(Some(bb), Some(ba)), dec!(100.9));
    }

    #[test]
    fn ofi_step_bid_lifts_from_spec() {
        let prev_bid = Some((dec!(100), dec!(5)));
        let curr_bid = Some((dec!(100.5), dec!(3)));
        let prev_ask = Some((dec!(101), dec!(5)));
        let curr_ask = Some((dec!(101), dec!(5)));
        let contribution = ofi_step(prev_bid, curr_bid, prev_ask, curr_ask);
        assert_eq!(contribution, dec!(3));
    }

    #[test]
    fn imbalance_is_zero_when_total_zero() {
        assert_eq!(imbalance(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn imbalance_bounds() {
        let v = imbalance(dec!(10), dec!(0));
        assert_eq!(v, dec!(1));
        let v = imbalance(dec!(0), dec!(10));
        assert_eq!(v, dec!(-1));
    }

    #[test]
    fn spread_and_mid_empty_side() {
        assert_eq!(spread(None, Some(dec!(101))), Decimal::ZERO);
        assert_eq!(mid(Some(dec!(100)), None), Decimal::ZERO);
    }

    #[test]
    fn microprice_falls_back_to_mid_when_no_volume() {
        let bb = (dec!(100), Decimal::ZERO);
        let ba = (dec!(102), Decimal::ZERO);
        assert_eq!(microprice(Some(bb), Some(ba)), dec!(101));
    }

    #[test]
    fn vpin_full_one_sided_flow_is_one() {
        assert_eq!(vpin(dec!(10), Decimal::ZERO), dec!(1));
        assert_eq!(vpin(dec!(5), dec!(5)), Decimal::ZERO);
    }
}
