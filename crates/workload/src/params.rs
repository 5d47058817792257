//! Input parameters of the five transaction profiles.
//!
//! Parameters are generated once per scheduled transaction and reused by
//! every retry of it.

use rand::rngs::StdRng;
use rand::RngExt;
use tpcc_core::scale::DISTRICTS_PER_WAREHOUSE;
use tpcc_core::{Scale, TransactionKind};

use crate::random;

/// How a transaction identifies its customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerSelector {
    Id(u32),
    /// All customers with this last name; the middle one by first name is
    /// chosen.
    LastName(String),
}

impl CustomerSelector {
    /// 60% by last name, 40% by id.
    fn generate(rng: &mut StdRng, scale: &Scale) -> Self {
        if rng.random_bool(0.6) {
            Self::LastName(random::lookup_last_name(rng, scale.max_last_name()))
        } else {
            Self::Id(rng.random_range(1..=scale.customers_per_district))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub i_id: u32,
    pub supply_w_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderParams {
    pub w_id: u32,
    pub d_id: u32,
    pub c_id: u32,
    pub lines: Vec<OrderLine>,
    /// The last line names a nonexistent item, so the transaction must roll
    /// back.
    pub rollback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentParams {
    pub w_id: u32,
    pub d_id: u32,
    pub c_w_id: u32,
    pub c_d_id: u32,
    pub customer: CustomerSelector,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryParams {
    pub w_id: u32,
    pub carrier_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusParams {
    pub w_id: u32,
    pub d_id: u32,
    pub customer: CustomerSelector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevelParams {
    pub w_id: u32,
    pub d_id: u32,
    pub threshold: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    NewOrder(NewOrderParams),
    Payment(PaymentParams),
    Delivery(DeliveryParams),
    OrderStatus(OrderStatusParams),
    StockLevel(StockLevelParams),
}

fn warehouse(rng: &mut StdRng, scale: &Scale) -> u32 {
    rng.random_range(1..=scale.warehouses)
}

fn district(rng: &mut StdRng) -> u32 {
    rng.random_range(1..=DISTRICTS_PER_WAREHOUSE)
}

/// A warehouse other than `home`; `home` itself when there is only one.
fn remote_warehouse(rng: &mut StdRng, scale: &Scale, home: u32) -> u32 {
    if scale.warehouses < 2 {
        return home;
    }
    let other = rng.random_range(1..scale.warehouses);
    if other >= home {
        other + 1
    } else {
        other
    }
}

impl Params {
    /// Draw parameters for `kind`.
    pub fn generate(kind: TransactionKind, rng: &mut StdRng, scale: &Scale) -> Self {
        match kind {
            TransactionKind::NewOrder => Self::NewOrder(Self::new_order(rng, scale)),
            TransactionKind::Payment => Self::Payment(Self::payment(rng, scale)),
            TransactionKind::Delivery => Self::Delivery(DeliveryParams {
                w_id: warehouse(rng, scale),
                carrier_id: rng.random_range(1..=10),
            }),
            TransactionKind::OrderStatus => Self::OrderStatus(OrderStatusParams {
                w_id: warehouse(rng, scale),
                d_id: district(rng),
                customer: CustomerSelector::generate(rng, scale),
            }),
            TransactionKind::StockLevel => Self::StockLevel(StockLevelParams {
                w_id: warehouse(rng, scale),
                d_id: district(rng),
                threshold: rng.random_range(10..=20),
            }),
        }
    }

    fn new_order(rng: &mut StdRng, scale: &Scale) -> NewOrderParams {
        let w_id = warehouse(rng, scale);
        let d_id = district(rng);
        let c_id = rng.random_range(1..=scale.customers_per_district);
        let count: usize = rng.random_range(5..=15);
        let rollback = rng.random_bool(0.01);
        let lines = (0..count)
            .map(|number| {
                let i_id = if rollback && number + 1 == count {
                    scale.items + 1
                } else {
                    rng.random_range(1..=scale.items)
                };
                let supply_w_id = if rng.random_bool(0.01) {
                    remote_warehouse(rng, scale, w_id)
                } else {
                    w_id
                };
                OrderLine {
                    i_id,
                    supply_w_id,
                    quantity: rng.random_range(1..=10),
                }
            })
            .collect();
        NewOrderParams {
            w_id,
            d_id,
            c_id,
            lines,
            rollback,
        }
    }

    fn payment(rng: &mut StdRng, scale: &Scale) -> PaymentParams {
        let w_id = warehouse(rng, scale);
        let d_id = district(rng);
        let (c_w_id, c_d_id) = if scale.warehouses < 2 || rng.random_bool(0.85) {
            (w_id, d_id)
        } else {
            (remote_warehouse(rng, scale, w_id), district(rng))
        };
        PaymentParams {
            w_id,
            d_id,
            c_w_id,
            c_d_id,
            customer: CustomerSelector::generate(rng, scale),
            amount: random::money(rng, 100, 500_000),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::NewOrder(_) => TransactionKind::NewOrder,
            Self::Payment(_) => TransactionKind::Payment,
            Self::Delivery(_) => TransactionKind::Delivery,
            Self::OrderStatus(_) => TransactionKind::OrderStatus,
            Self::StockLevel(_) => TransactionKind::StockLevel,
        }
    }

    /// Whether a client-side abort is the expected result.
    #[must_use]
    pub const fn expects_rollback(&self) -> bool {
        matches!(self, Self::NewOrder(params) if params.rollback)
    }
}
