//! Portfolio accounting: balances, realized PnL, and mark-to-market equity.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::order::OrderSide;

/// A point-in-time view of the portfolio, suitable for embedding in a
/// ladder payload (spec §6's optional `portfolio` block).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub usd: f64,
    pub btc: f64,
    pub equity: f64,
    pub fees_enabled: bool,
    pub open_orders: usize,
}

/// Balance mutations, realized PnL (average-cost basis), and fee
/// bookkeeping for the paper-trading account.
#[derive(Debug, Clone)]
pub struct Portfolio {
    quote_balance: Decimal,
    base_balance: Decimal,
    avg_cost_basis: Decimal,
    realized_pnl: Decimal,
    traded_notional: Decimal,
    fees_enabled: bool,
    maker_fee_rate: Decimal,
    taker_fee_rate: Decimal,
    initial_quote_balance: Decimal,
    initial_base_balance: Decimal,
}

impl Portfolio {
    pub fn new(
        initial_quote_balance: Decimal,
        initial_base_balance: Decimal,
        maker_fee_rate: Decimal,
        taker_fee_rate: Decimal,
        fees_enabled: bool,
    ) -> Self {
        Self {
            quote_balance: initial_quote_balance,
            base_balance: initial_base_balance,
            avg_cost_basis: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            traded_notional: Decimal::ZERO,
            fees_enabled,
            maker_fee_rate,
            taker_fee_rate,
            initial_quote_balance,
            initial_base_balance,
        }
    }

    pub fn quote_balance(&self) -> Decimal {
        self.quote_balance
    }

    pub fn base_balance(&self) -> Decimal {
        self.base_balance
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn traded_notional(&self) -> Decimal {
        self.traded_notional
    }

    pub fn fees_enabled(&self) -> bool {
        self.fees_enabled
    }

    pub fn set_fees_enabled(&mut self, enabled: bool) {
        self.fees_enabled = enabled;
    }

    /// `balance_usd + balance_btc * mark`.
    pub fn equity(&self, mark_price: Decimal) -> Decimal {
        self.quote_balance + self.base_balance * mark_price
    }

    /// Applies one fill's balance mutation and fee per spec §4.4
    /// `finalize_fill`: `cost = qty * price`; `fee = cost * rate` if fees
    /// are enabled, else zero; USD is debited for both the cost and the fee
    /// on either side (spec §9's pinned fee-deduction decision). Returns the
    /// fee actually charged.
    pub fn apply_fill(&mut self, side: OrderSide, qty: Decimal, price: Decimal, is_maker: bool) -> Decimal {
        let cost = qty * price;
        let rate = if is_maker {
            self.maker_fee_rate
        } else {
            self.taker_fee_rate
        };
        let fee = if self.fees_enabled { cost * rate } else { Decimal::ZERO };

        match side {
            OrderSide::Buy => {
                self.quote_balance -= cost + fee;
                self.update_cost_basis_on_buy(qty, price);
                self.base_balance += qty;
            }
            OrderSide::Sell => {
                self.realize_pnl_on_sell(qty, price);
                self.base_balance -= qty;
                self.quote_balance += cost - fee;
            }
        }

        self.traded_notional += cost;
        fee
    }

    fn update_cost_basis_on_buy(&mut self, qty: Decimal, price: Decimal) {
        let existing_value = self.avg_cost_basis * self.base_balance;
        let new_total_qty = self.base_balance + qty;
        if new_total_qty == Decimal::ZERO {
            self.avg_cost_basis = Decimal::ZERO;
        } else {
            self.avg_cost_basis = (existing_value + qty * price) / new_total_qty;
        }
    }

    fn realize_pnl_on_sell(&mut self, qty: Decimal, price: Decimal) {
        self.realized_pnl += qty * (price - self.avg_cost_basis);
    }

    /// Restores initial balances and clears PnL/fee accounting, preserving
    /// the instance (no replacement of `self`) so shared references keep
    /// observing the same object per spec §9.
    pub fn reset(&mut self) {
        self.quote_balance = self.initial_quote_balance;
        self.base_balance = self.initial_base_balance;
        self.avg_cost_basis = Decimal::ZERO;
        self.realized_pnl = Decimal::ZERO;
        self.traded_notional = Decimal::ZERO;
    }

    pub fn snapshot(&self, mark_price: Decimal, open_orders: usize) -> PortfolioSnapshot {
        use rust_decimal::prelude::ToPrimitive;
        PortfolioSnapshot {
            usd: self.quote_balance.to_f64().unwrap_or(0.0),
            btc: self.base_balance.to_f64().unwrap_or(0.0),
            equity: self.equity(mark_price).to_f64().unwrap_or(0.0),
            fees_enabled: self.fees_enabled,
            open_orders,
        }
    }
}
