//! Table cardinalities derived from the warehouse count.

use derive_more::{Display, Error};

/// Districts per warehouse. Fixed by TPC-C.
pub const DISTRICTS_PER_WAREHOUSE: u32 = 10;

/// Standard TPC-C customers per district.
pub const CUSTOMERS_PER_DISTRICT: u32 = 3_000;

/// Standard TPC-C item count.
pub const ITEMS: u32 = 100_000;

/// Standard TPC-C undelivered orders per district after loading.
pub const NEW_ORDERS_PER_DISTRICT: u32 = 900;

/// Number of distinct customer last names generated from syllables.
pub const LAST_NAMES: u32 = 1_000;

/// Process-wide scale parameters.
///
/// Read-only after initialization and shared by the loader, the parameter
/// generators and the consistency checker; all three must see the same
/// value. Every district starts with one order per customer, the last
/// `new_orders_per_district` of which are undelivered.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scale {
    pub warehouses: u32,
    pub customers_per_district: u32,
    pub items: u32,
    pub new_orders_per_district: u32,
}

/// Scale parameters that cannot describe a loadable database.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ScaleError {
    #[display("warehouse count must be positive")]
    NoWarehouses,
    #[display("customers per district must be positive")]
    NoCustomers,
    #[display("item count must be positive")]
    NoItems,
    #[display("{new_orders} new orders per district exceed {customers} initial orders")]
    TooManyNewOrders { new_orders: u32, customers: u32 },
}

impl Scale {
    /// Standard TPC-C cardinalities for `warehouses` warehouses.
    #[must_use]
    pub const fn standard(warehouses: u32) -> Self {
        Self {
            warehouses,
            customers_per_district: CUSTOMERS_PER_DISTRICT,
            items: ITEMS,
            new_orders_per_district: NEW_ORDERS_PER_DISTRICT,
        }
    }

    /// # Errors
    ///
    /// Returns a [`ScaleError`] when a cardinality is zero or there are more
    /// undelivered orders than orders.
    pub const fn validate(&self) -> Result<(), ScaleError> {
        if self.warehouses == 0 {
            return Err(ScaleError::NoWarehouses);
        }
        if self.customers_per_district == 0 {
            return Err(ScaleError::NoCustomers);
        }
        if self.items == 0 {
            return Err(ScaleError::NoItems);
        }
        if self.new_orders_per_district > self.customers_per_district {
            return Err(ScaleError::TooManyNewOrders {
                new_orders: self.new_orders_per_district,
                customers: self.customers_per_district,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn districts(&self) -> u64 {
        self.warehouses as u64 * DISTRICTS_PER_WAREHOUSE as u64
    }

    #[must_use]
    pub const fn customers(&self) -> u64 {
        self.districts() * self.customers_per_district as u64
    }

    /// One history row per customer.
    #[must_use]
    pub const fn history(&self) -> u64 {
        self.customers()
    }

    /// One initial order per customer.
    #[must_use]
    pub const fn orders(&self) -> u64 {
        self.customers()
    }

    #[must_use]
    pub const fn orders_per_district(&self) -> u32 {
        self.customers_per_district
    }

    #[must_use]
    pub const fn new_orders(&self) -> u64 {
        self.districts() * self.new_orders_per_district as u64
    }

    /// Expected order lines: ten per order on average, the exact count
    /// depends on the generated `o_ol_cnt` values.
    #[must_use]
    pub const fn approx_order_lines(&self) -> u64 {
        self.orders() * 10
    }

    #[must_use]
    pub const fn stock(&self) -> u64 {
        self.warehouses as u64 * self.items as u64
    }

    /// Highest last-name number used by customer lookups.
    #[must_use]
    pub const fn max_last_name(&self) -> u32 {
        if self.customers_per_district < LAST_NAMES {
            self.customers_per_district - 1
        } else {
            LAST_NAMES - 1
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::standard(1)
    }
}
