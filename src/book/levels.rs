//! Ordered price-level maps: bids descending, asks ascending.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// One side of the book, keyed by price to aggregate quantity.
///
/// Bids and asks use the same underlying `BTreeMap<Decimal, Decimal>`; the
/// "descending" ordering for bids is a property of how callers iterate
/// (`.iter().rev()`), not of a distinct key type, matching the asymmetry in
/// the feed wire format (bids and asks are two flat `[price, qty]` arrays).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceLevels {
    levels: BTreeMap<Decimal, Decimal>,
}

impl PriceLevels {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Applies a single `[price, qty]` delta: qty zero removes the level,
    /// qty positive replaces it outright (not additive — the feed sends
    /// absolute level quantities, not deltas-on-top-of-existing).
    pub fn apply(&mut self, price: Decimal, qty: Decimal) {
        if qty <= Decimal::ZERO {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, qty);
        }
    }

    pub fn quantity_at(&self, price: Decimal) -> Option<Decimal> {
        self.levels.get(&price).copied()
    }

    /// Lowest price in the map — the natural extremum for asks.
    pub fn lowest(&self) -> Option<(Decimal, Decimal)> {
        self.levels.iter().next().map(|(p, q)| (*p, *q))
    }

    /// Highest price in the map — the natural extremum for bids.
    pub fn highest(&self) -> Option<(Decimal, Decimal)> {
        self.levels.iter().next_back().map(|(p, q)| (*p, *q))
    }

    /// Top `n` levels ordered ascending by price.
    pub fn top_ascending(&self, n: usize) -> Vec<(Decimal, Decimal)> {
        self.levels.iter().take(n).map(|(p, q)| (*p, *q)).collect()
    }

    /// Top `n` levels ordered descending by price.
    pub fn top_descending(&self, n: usize) -> Vec<(Decimal, Decimal)> {
        self.levels
            .iter()
            .rev()
            .take(n)
            .map(|(p, q)| (*p, *q))
            .collect()
    }

    /// Sum of quantity across the first `n` levels in the given order.
    pub fn top_volume(&self, n: usize, descending: bool) -> Decimal {
        if descending {
            self.levels.iter().rev().take(n).map(|(_, q)| *q).sum()
        } else {
            self.levels.iter().take(n).map(|(_, q)| *q).sum()
        }
    }

    pub fn iter_ascending(&self) -> impl Iterator<Item = (&Decimal, &Decimal)> {
        self.levels.iter()
    }
}
