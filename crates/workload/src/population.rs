//! Deterministic TPC-C initial population.
//!
//! Rows are produced as [`Insert`] statements, table by table in
//! [`schema::TABLES`](crate::schema::TABLES) order, and handed to a sink as
//! they are generated so that nothing but the per-order line counts is
//! held in memory.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};
use tpcc_core::scale::{DISTRICTS_PER_WAREHOUSE, LAST_NAMES};
use tpcc_core::Scale;
use tpcc_drivers::sql::Insert;

use crate::random::{self, C_LAST};

/// Timestamp stamped on every loaded row.
pub const LOAD_TIME: &str = "2024-01-01 00:00:00";

/// Generator of the initial database content for one scale.
pub struct Population {
    scale: Scale,
    rng: StdRng,
    /// `o_ol_cnt` of every initial order, per district in load order.
    line_counts: Vec<Vec<u32>>,
}

/// `i_data`/`s_data`: random letters, one in ten containing `ORIGINAL`.
fn data(rng: &mut StdRng) -> String {
    let mut data = random::alpha_string(rng, 26, 50);
    if rng.random_bool(0.1) {
        let at = rng.random_range(0..=data.len() - 8);
        data.replace_range(at..at + 8, "ORIGINAL");
    }
    data
}

/// Tax rate in `[0.0000, 0.2000]`.
fn tax(rng: &mut StdRng) -> f64 {
    f64::from(rng.random_range(0..=2_000_u32)) / 10_000.0
}

fn address(rng: &mut StdRng, insert: Insert) -> Insert {
    insert
        .value(random::alpha_string(rng, 10, 20))
        .value(random::alpha_string(rng, 10, 20))
        .value(random::alpha_string(rng, 10, 20))
        .value(random::alpha_string(rng, 2, 2))
        .value(random::zip(rng))
}

impl Population {
    #[must_use]
    pub fn new(scale: Scale, seed: u64) -> Self {
        Self {
            scale,
            rng: StdRng::seed_from_u64(seed),
            line_counts: Vec::new(),
        }
    }

    fn districts(&self) -> impl Iterator<Item = (u32, u32)> {
        (1..=self.scale.warehouses)
            .flat_map(|w_id| (1..=DISTRICTS_PER_WAREHOUSE).map(move |d_id| (w_id, d_id)))
    }

    /// Stream every row to `emit` together with its table name.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error of `emit`.
    pub fn generate<F, E>(mut self, mut emit: F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        self.items(&mut emit)?;
        self.warehouses(&mut emit)?;
        self.stock(&mut emit)?;
        self.district(&mut emit)?;
        self.customers(&mut emit)?;
        self.history(&mut emit)?;
        self.orders(&mut emit)?;
        self.order_lines(&mut emit)?;
        self.new_orders(&mut emit)
    }

    fn items<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let rng = &mut self.rng;
        for i_id in 1..=self.scale.items {
            emit(
                "item",
                Insert::table("item")
                    .value(i_id)
                    .value(rng.random_range(1..=10_000_u32))
                    .value(random::alpha_string(rng, 14, 24))
                    .value(random::money(rng, 100, 10_000))
                    .value(data(rng)),
            )?;
        }
        Ok(())
    }

    fn warehouses<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let rng = &mut self.rng;
        for w_id in 1..=self.scale.warehouses {
            let insert = Insert::table("warehouse")
                .value(w_id)
                .value(random::alpha_string(rng, 6, 10));
            emit(
                "warehouse",
                address(rng, insert).value(tax(rng)).value(300_000.0),
            )?;
        }
        Ok(())
    }

    fn stock<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let rng = &mut self.rng;
        for w_id in 1..=self.scale.warehouses {
            for i_id in 1..=self.scale.items {
                let mut insert = Insert::table("stock")
                    .value(i_id)
                    .value(w_id)
                    .value(rng.random_range(10..=100_u32));
                for _ in 0..DISTRICTS_PER_WAREHOUSE {
                    insert = insert.value(random::alpha_string(rng, 24, 24));
                }
                emit(
                    "stock",
                    insert
                        .value(0.0)
                        .value(0_u32)
                        .value(0_u32)
                        .value(data(rng)),
                )?;
            }
        }
        Ok(())
    }

    fn district<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let next_o_id = self.scale.orders_per_district() + 1;
        for (w_id, d_id) in self.districts().collect::<Vec<_>>() {
            let rng = &mut self.rng;
            let insert = Insert::table("district")
                .value(d_id)
                .value(w_id)
                .value(random::alpha_string(rng, 6, 10));
            emit(
                "district",
                address(rng, insert)
                    .value(tax(rng))
                    .value(30_000.0)
                    .value(next_o_id),
            )?;
        }
        Ok(())
    }

    fn customers<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        for (w_id, d_id) in self.districts().collect::<Vec<_>>() {
            for c_id in 1..=self.scale.customers_per_district {
                let rng = &mut self.rng;
                let last = if c_id <= LAST_NAMES {
                    random::last_name(c_id - 1)
                } else {
                    random::last_name(random::nurand(rng, 255, C_LAST, 0, LAST_NAMES - 1))
                };
                let insert = Insert::table("customer")
                    .value(c_id)
                    .value(d_id)
                    .value(w_id)
                    .value(random::alpha_string(rng, 8, 16))
                    .value("OE")
                    .value(last);
                let credit = if rng.random_bool(0.1) { "BC" } else { "GC" };
                emit(
                    "customer",
                    address(rng, insert)
                        .value(random::numeric_string(rng, 16))
                        .value(LOAD_TIME)
                        .value(credit)
                        .value(50_000.0)
                        .value(f64::from(rng.random_range(0..=5_000_u32)) / 10_000.0)
                        .value(-10.0)
                        .value(10.0)
                        .value(1_u32)
                        .value(0_u32)
                        .value(random::alpha_string(rng, 300, 500)),
                )?;
            }
        }
        Ok(())
    }

    fn history<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        for (w_id, d_id) in self.districts().collect::<Vec<_>>() {
            for c_id in 1..=self.scale.customers_per_district {
                emit(
                    "history",
                    Insert::table("history")
                        .value(c_id)
                        .value(d_id)
                        .value(w_id)
                        .value(d_id)
                        .value(w_id)
                        .value(LOAD_TIME)
                        .value(10.0)
                        .value(random::alpha_string(&mut self.rng, 12, 24)),
                )?;
            }
        }
        Ok(())
    }

    /// First order id of a district that is still undelivered.
    const fn first_undelivered(&self) -> u32 {
        self.scale.orders_per_district() - self.scale.new_orders_per_district + 1
    }

    fn orders<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let first_undelivered = self.first_undelivered();
        for (w_id, d_id) in self.districts().collect::<Vec<_>>() {
            let rng = &mut self.rng;
            let mut customers: Vec<u32> = (1..=self.scale.customers_per_district).collect();
            customers.shuffle(rng);
            let mut counts = Vec::with_capacity(customers.len());
            for (o_id, c_id) in (1_u32..).zip(customers) {
                let ol_cnt = rng.random_range(5..=15_u32);
                let carrier = if o_id < first_undelivered {
                    rng.random_range(1..=10_u32)
                } else {
                    0
                };
                emit(
                    "orders",
                    Insert::table("orders")
                        .value(o_id)
                        .value(d_id)
                        .value(w_id)
                        .value(c_id)
                        .value(LOAD_TIME)
                        .value(carrier)
                        .value(ol_cnt)
                        .value(1_u32),
                )?;
                counts.push(ol_cnt);
            }
            self.line_counts.push(counts);
        }
        Ok(())
    }

    fn order_lines<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let first_undelivered = self.first_undelivered();
        let districts: Vec<_> = self.districts().collect();
        for ((w_id, d_id), counts) in districts.into_iter().zip(&self.line_counts) {
            let rng = &mut self.rng;
            for (o_id, &ol_cnt) in (1_u32..).zip(counts) {
                let delivered = o_id < first_undelivered;
                for number in 1..=ol_cnt {
                    let amount = if delivered {
                        0.0
                    } else {
                        random::money(rng, 1, 999_999)
                    };
                    emit(
                        "order_line",
                        Insert::table("order_line")
                            .value(o_id)
                            .value(d_id)
                            .value(w_id)
                            .value(number)
                            .value(rng.random_range(1..=self.scale.items))
                            .value(w_id)
                            .value(LOAD_TIME)
                            .value(5_u32)
                            .value(amount)
                            .value(random::alpha_string(rng, 24, 24)),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn new_orders<F, E>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'static str, Insert) -> Result<(), E>,
    {
        let first_undelivered = self.first_undelivered();
        for (w_id, d_id) in self.districts().collect::<Vec<_>>() {
            for o_id in first_undelivered..=self.scale.orders_per_district() {
                emit(
                    "new_orders",
                    Insert::table("new_orders")
                        .value(o_id)
                        .value(d_id)
                        .value(w_id),
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use hashbrown::HashMap;

    use super::*;

    fn tiny() -> Scale {
        Scale {
            warehouses: 2,
            customers_per_district: 12,
            items: 50,
            new_orders_per_district: 4,
        }
    }

    fn generate(seed: u64) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        Population::new(tiny(), seed)
            .generate(|table, insert| {
                rows.push((table, insert.to_string()));
                Ok::<_, Infallible>(())
            })
            .unwrap();
        rows
    }

    #[test]
    fn test_cardinalities() {
        let scale = tiny();
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for (table, _) in generate(1) {
            *counts.entry(table).or_default() += 1;
        }
        assert_eq!(counts["item"], u64::from(scale.items));
        assert_eq!(counts["warehouse"], 2);
        assert_eq!(counts["stock"], scale.stock());
        assert_eq!(counts["district"], scale.districts());
        assert_eq!(counts["customer"], scale.customers());
        assert_eq!(counts["history"], scale.history());
        assert_eq!(counts["orders"], scale.orders());
        assert_eq!(counts["new_orders"], scale.new_orders());
        let lines = counts["order_line"];
        assert!((scale.orders() * 5..=scale.orders() * 15).contains(&lines));
    }

    #[test]
    fn test_table_order_and_determinism() {
        let rows = generate(7);
        assert_eq!(rows, generate(7));
        assert_ne!(rows, generate(8));

        let mut order: Vec<&str> = rows.iter().map(|(table, _)| *table).collect();
        order.dedup();
        assert_eq!(order, crate::schema::TABLES);
    }

    #[test]
    fn test_district_counter_and_undelivered_orders() {
        let rows = generate(3);
        let district = rows
            .iter()
            .find(|(table, _)| *table == "district")
            .map(|(_, sql)| sql.clone())
            .unwrap();
        assert!(district.ends_with(",13);"), "{district}");

        let first_new_order = rows
            .iter()
            .find(|(table, _)| *table == "new_orders")
            .map(|(_, sql)| sql.clone())
            .unwrap();
        assert_eq!(first_new_order, "insert into new_orders values (9,1,1);");
    }
}
