//! Order catalog: the `Order` type, its lifecycle, and the open-order index.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;

/// Opaque unique order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random id, grounded on the teacher's `OrderId::new_random`.
    pub fn new_random() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    Pending,
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A submitted order, tracked through its full lifecycle.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub created_at_millis: u64,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub avg_fill_price: Option<Decimal>,
    /// Trade-tape volume observed at this order's price since submission.
    /// Only meaningful for LIMIT orders; see `matcher` limit-advancement rule.
    pub processed_volume: Decimal,
}

impl Order {
    pub fn new(
        id: OrderId,
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Self {
        let created_at_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            id,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price,
            created_at_millis,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            processed_volume: Decimal::ZERO,
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }
}

/// Catalog of all submitted orders plus the open-order index, kept as a
/// separate `HashSet` for O(1) membership per spec §9's index guidance.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
    open_index: HashSet<OrderId>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order) {
        if order.status == OrderStatus::Open {
            self.open_index.insert(order.id.clone());
        }
        self.orders.insert(order.id.clone(), order);
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn get_mut(&mut self, id: &OrderId) -> Option<&mut Order> {
        self.orders.get_mut(id)
    }

    /// Marks an order open and adds it to the index. No-op if missing.
    pub fn mark_open(&mut self, id: &OrderId) {
        if let Some(order) = self.orders.get_mut(id) {
            order.status = OrderStatus::Open;
            self.open_index.insert(id.clone());
        }
    }

    /// Marks an order filled/cancelled and removes it from the index.
    pub fn mark_terminal(&mut self, id: &OrderId, status: OrderStatus) {
        debug_assert!(status.is_terminal());
        if let Some(order) = self.orders.get_mut(id) {
            order.status = status;
        }
        self.open_index.remove(id);
    }

    pub fn is_open(&self, id: &OrderId) -> bool {
        self.open_index.contains(id)
    }

    pub fn open_order_ids(&self) -> impl Iterator<Item = &OrderId> {
        self.open_index.iter()
    }

    pub fn open_orders_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        let open = &self.open_index;
        self.orders
            .values_mut()
            .filter(move |o| open.contains(&o.id))
    }

    pub fn open_count(&self) -> usize {
        self.open_index.len()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.open_index.clear();
    }
}
