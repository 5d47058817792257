//! The five TPC-C transaction profiles and the retry loop driving them.
//!
//! Every profile runs `BEGIN`, its reads and writes, then `COMMIT` through
//! the [`DbClient`] convenience surface. Each statement result goes through
//! [`classify`]; the first one that is not `Ok` interrupts the body and
//! decides the outcome of the attempt:
//!
//! - `ClientAbort`: a required row was missing. The engine sends `ABORT;`
//!   and retries with the same parameters, except for a NewOrder that was
//!   generated to roll back, which is recorded once and dropped.
//! - `ServerAbort`: the target already rolled back; retry.
//! - `Error`: fatal for the worker.
//!
//! Retries are bounded by `max_retries`.

use core::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use hashbrown::HashSet;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tpcc_core::scale::DISTRICTS_PER_WAREHOUSE;
use tpcc_core::{
    classify, Outcome, QueryResult, Requirement, Scale, ServerState, TransactionRecord,
};
use tpcc_drivers::sql::{Delete, Insert, Op, Order, Predicate, Select, SqlValue, Update};
use tpcc_drivers::DbClient;

use crate::mix::{Mix, Phase};
use crate::params::{
    CustomerSelector, DeliveryParams, NewOrderParams, OrderStatusParams, Params, PaymentParams,
    StockLevelParams,
};
use crate::random::worker_rng;
use crate::{BenchConfig, Error};

/// How a worker's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every scheduled transaction was executed.
    Completed,
    /// Stopped between transactions on operator request.
    Cancelled,
    /// Stopped by an unrecoverable failure.
    Fatal(String),
}

impl Termination {
    /// Process exit status of a worker that ended this way.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Fatal(_) => 2,
            Self::Cancelled => 3,
        }
    }
}

/// Why a transaction body stopped before its commit.
enum Interrupt {
    Rejected { outcome: Outcome, result: QueryResult },
    Client(tpcc_drivers::Error),
}

impl From<tpcc_drivers::Error> for Interrupt {
    fn from(err: tpcc_drivers::Error) -> Self {
        Self::Client(err)
    }
}

type Step<T> = Result<T, Interrupt>;

fn check(result: QueryResult, requirement: Requirement) -> Step<QueryResult> {
    match classify(&result, requirement) {
        Outcome::Ok => Ok(result),
        outcome => Err(Interrupt::Rejected { outcome, result }),
    }
}

/// Integer cell, accepting a decimal rendering of an integral value.
pub(crate) fn parse_int(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    cell.parse().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && value.fract() == 0.0)
            .map(|value| value as i64)
    })
}

fn cell<'r>(result: &'r QueryResult, row: usize, column: usize) -> Step<&'r str> {
    result
        .rows()
        .get(row)
        .and_then(|cells| cells.get(column))
        .map(String::as_str)
        .ok_or_else(|| malformed(result))
}

fn malformed(result: &QueryResult) -> Interrupt {
    Interrupt::Rejected {
        outcome: Outcome::Error,
        result: QueryResult::error(format!("unexpected response: {}", result.raw()))
            .with_sql(result.sql().unwrap_or_default()),
    }
}

fn int(result: &QueryResult, row: usize, column: usize) -> Step<i64> {
    parse_int(cell(result, row, column)?).ok_or_else(|| malformed(result))
}

fn number<T: FromStr>(result: &QueryResult, row: usize, column: usize) -> Step<T> {
    cell(result, row, column)?
        .trim()
        .parse()
        .map_err(|_| malformed(result))
}

fn text(result: &QueryResult, row: usize, column: usize) -> Step<String> {
    cell(result, row, column).map(str::to_owned)
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Stock quantity after ordering `ordered` units: decremented while at
/// least 10 remain, otherwise restocked by 91.
#[must_use]
pub const fn next_stock_quantity(quantity: i64, ordered: i64) -> i64 {
    if quantity - ordered >= 10 {
        quantity - ordered
    } else {
        quantity - ordered + 91
    }
}

/// Index of the customer chosen among `count` namesakes sorted by first
/// name.
#[must_use]
pub const fn middle(count: usize) -> usize {
    count / 2
}

/// Drives transactions for one worker over one client.
pub struct Engine<'a, C> {
    client: C,
    scale: Scale,
    max_retries: u32,
    worker: usize,
    rng: StdRng,
    cancel: &'a AtomicBool,
    records: Vec<TransactionRecord>,
}

impl<'a, C: DbClient> Engine<'a, C> {
    pub fn new(client: C, config: &BenchConfig, worker: usize, cancel: &'a AtomicBool) -> Self {
        Self {
            client,
            scale: config.scale,
            max_retries: config.max_retries,
            worker,
            rng: worker_rng(config.seed, worker),
            cancel,
            records: Vec::new(),
        }
    }

    pub fn connect(&mut self) -> ServerState {
        self.client.connect()
    }

    pub fn close(&mut self) {
        self.client.close();
    }

    #[must_use]
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }

    /// Execute `count` transactions drawn from the mix of `phase`, passing
    /// every new record to `on_record` as soon as it exists.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped the worker. Records of all
    /// attempts made so far stay available through [`Self::records`].
    pub fn run<F>(&mut self, phase: Phase, count: u64, mut on_record: F) -> Result<Termination, Error>
    where
        F: FnMut(&TransactionRecord),
    {
        let mix = Mix::new(phase)?;
        for scheduled in 0..count {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::warn!(worker = self.worker, %phase, done = scheduled, "cancelled");
                return Ok(Termination::Cancelled);
            }
            let kind = mix.choose(&mut self.rng);
            let params = Params::generate(kind, &mut self.rng, &self.scale);
            let before = self.records.len();
            let result = self.run_transaction(&params);
            self.records[before..].iter().for_each(&mut on_record);
            result?;
        }
        tracing::info!(worker = self.worker, %phase, count, "phase finished");
        Ok(Termination::Completed)
    }

    /// Run one scheduled transaction to completion, retrying aborted
    /// attempts. Returns whether it committed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryExhausted`] once the retry budget is spent and
    /// any fatal error of an attempt.
    pub fn run_transaction(&mut self, params: &Params) -> Result<bool, Error> {
        let kind = params.kind();
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            let start = Local::now();
            let outcome = self.attempt(params);
            let end = Local::now();
            let succeeded = matches!(outcome, Ok(Outcome::Ok));
            self.records
                .push(TransactionRecord::new(kind, start, end, succeeded));
            match outcome? {
                Outcome::Ok => return Ok(true),
                Outcome::ClientAbort if params.expects_rollback() => {
                    tracing::debug!(worker = self.worker, %kind, "mandated rollback");
                    return Ok(false);
                }
                outcome if attempts > self.max_retries => {
                    tracing::error!(worker = self.worker, %kind, attempts, %outcome, "retry budget spent");
                    return Err(Error::RetryExhausted { kind, attempts });
                }
                outcome => {
                    tracing::debug!(worker = self.worker, %kind, attempt = attempts, %outcome, "retrying");
                }
            }
        }
    }

    fn attempt(&mut self, params: &Params) -> Result<Outcome, Error> {
        let kind = params.kind();
        let body = match params {
            Params::NewOrder(params) => self.new_order(params),
            Params::Payment(params) => self.payment(params),
            Params::Delivery(params) => self.delivery(params),
            Params::OrderStatus(params) => self.order_status(params),
            Params::StockLevel(params) => self.stock_level(params),
        };
        match body {
            Ok(()) => Ok(Outcome::Ok),
            Err(Interrupt::Client(err)) => Err(err.into()),
            Err(Interrupt::Rejected {
                outcome: Outcome::ClientAbort,
                result,
            }) => {
                tracing::debug!(worker = self.worker, %kind, %result, "required row missing");
                let abort = self.client.abort()?;
                if classify(&abort, Requirement::Any) == Outcome::Error {
                    return Err(Error::Fatal {
                        kind,
                        result: abort,
                    });
                }
                Ok(Outcome::ClientAbort)
            }
            Err(Interrupt::Rejected {
                outcome: Outcome::ServerAbort,
                result,
            }) => {
                tracing::debug!(worker = self.worker, %kind, %result, "server abort");
                Ok(Outcome::ServerAbort)
            }
            Err(Interrupt::Rejected { result, .. }) => {
                tracing::error!(worker = self.worker, %kind, %result, "fatal result");
                Err(Error::Fatal { kind, result })
            }
        }
    }

    fn select(&mut self, query: &Select, requirement: Requirement) -> Step<QueryResult> {
        check(self.client.select(query)?, requirement)
    }

    fn insert(&mut self, stmt: &Insert) -> Step<()> {
        check(self.client.insert(stmt)?, Requirement::Any).map(drop)
    }

    fn update(&mut self, stmt: &Update) -> Step<()> {
        check(self.client.update(stmt)?, Requirement::Any).map(drop)
    }

    fn begin(&mut self) -> Step<()> {
        check(self.client.begin()?, Requirement::Any).map(drop)
    }

    fn commit(&mut self) -> Step<()> {
        check(self.client.commit()?, Requirement::Any).map(drop)
    }

    fn new_order(&mut self, params: &NewOrderParams) -> Step<()> {
        let NewOrderParams {
            w_id, d_id, c_id, ..
        } = *params;
        self.begin()?;

        let district = self.select(
            &Select::table("district")
                .columns(["d_tax", "d_next_o_id"])
                .eq("d_w_id", w_id)
                .eq("d_id", d_id),
            Requirement::Row,
        )?;
        let d_tax: f64 = number(&district, 0, 0)?;
        let o_id = int(&district, 0, 1)?;
        self.update(
            &Update::table("district")
                .set("d_next_o_id", o_id + 1)
                .eq("d_w_id", w_id)
                .eq("d_id", d_id),
        )?;

        let customer = self.select(
            &Select::table("customer")
                .join("warehouse")
                .columns(["c_discount", "c_last", "c_credit", "w_tax"])
                .eq("w_id", w_id)
                .filter(Predicate::eq("c_w_id", SqlValue::expr("w_id")))
                .eq("c_d_id", d_id)
                .eq("c_id", c_id),
            Requirement::Row,
        )?;
        let c_discount: f64 = number(&customer, 0, 0)?;
        let w_tax: f64 = number(&customer, 0, 3)?;

        let entry = timestamp();
        let all_local = params.lines.iter().all(|line| line.supply_w_id == w_id);
        self.insert(
            &Insert::table("orders")
                .value(o_id)
                .value(d_id)
                .value(w_id)
                .value(c_id)
                .value(entry.as_str())
                .value(0_u32)
                .value(params.lines.len() as u32)
                .value(i64::from(all_local)),
        )?;
        self.insert(
            &Insert::table("new_orders")
                .value(o_id)
                .value(d_id)
                .value(w_id),
        )?;

        let dist_column = format!("s_dist_{d_id:02}");
        let mut total = 0.0;
        for (number_in_order, line) in (1_u32..).zip(&params.lines) {
            let item = self.select(
                &Select::table("item")
                    .columns(["i_price", "i_name", "i_data"])
                    .eq("i_id", line.i_id),
                Requirement::Row,
            )?;
            let price: f64 = number(&item, 0, 0)?;
            let i_data = text(&item, 0, 2)?;

            let stock = self.select(
                &Select::table("stock")
                    .columns([
                        "s_quantity",
                        dist_column.as_str(),
                        "s_ytd",
                        "s_order_cnt",
                        "s_remote_cnt",
                        "s_data",
                    ])
                    .eq("s_i_id", line.i_id)
                    .eq("s_w_id", line.supply_w_id),
                Requirement::Row,
            )?;
            let quantity = int(&stock, 0, 0)?;
            let dist_info = text(&stock, 0, 1)?;
            let s_ytd: f64 = number(&stock, 0, 2)?;
            let order_cnt = int(&stock, 0, 3)?;
            let remote_cnt = int(&stock, 0, 4)?;
            let s_data = text(&stock, 0, 5)?;

            let remote = line.supply_w_id != w_id;
            self.update(
                &Update::table("stock")
                    .set(
                        "s_quantity",
                        next_stock_quantity(quantity, i64::from(line.quantity)),
                    )
                    .set("s_ytd", s_ytd + f64::from(line.quantity))
                    .set("s_order_cnt", order_cnt + 1)
                    .set("s_remote_cnt", remote_cnt + i64::from(remote))
                    .eq("s_i_id", line.i_id)
                    .eq("s_w_id", line.supply_w_id),
            )?;

            let amount = f64::from(line.quantity) * price;
            let brand = if i_data.contains("ORIGINAL") && s_data.contains("ORIGINAL") {
                'B'
            } else {
                'G'
            };
            tracing::trace!(i_id = line.i_id, amount, %brand, "order line");
            self.insert(
                &Insert::table("order_line")
                    .value(o_id)
                    .value(d_id)
                    .value(w_id)
                    .value(number_in_order)
                    .value(line.i_id)
                    .value(line.supply_w_id)
                    .value(entry.as_str())
                    .value(line.quantity)
                    .value(amount)
                    .value(dist_info),
            )?;
            total += amount;
        }

        let total = total * (1.0 - c_discount) * (1.0 + w_tax + d_tax);
        tracing::trace!(w_id, d_id, o_id, total, "new order placed");
        self.commit()
    }

    /// Locate a customer of `(w_id, d_id)` and return the result holding it
    /// together with the index of its row.
    fn find_customer(
        &mut self,
        w_id: u32,
        d_id: u32,
        selector: &CustomerSelector,
        columns: &[&str],
    ) -> Step<(QueryResult, usize)> {
        let query = Select::table("customer")
            .columns(columns.iter().copied())
            .eq("c_w_id", w_id)
            .eq("c_d_id", d_id);
        let query = match selector {
            CustomerSelector::Id(c_id) => query.eq("c_id", *c_id),
            CustomerSelector::LastName(last) => query
                .eq("c_last", last.as_str())
                .order_by("c_first", Order::Asc),
        };
        let result = self.select(&query, Requirement::Row)?;
        let row = middle(result.rows().len());
        Ok((result, row))
    }

    fn payment(&mut self, params: &PaymentParams) -> Step<()> {
        let PaymentParams {
            w_id,
            d_id,
            c_w_id,
            c_d_id,
            amount,
            ..
        } = *params;
        self.begin()?;

        let warehouse = self.select(
            &Select::table("warehouse")
                .columns([
                    "w_name",
                    "w_street_1",
                    "w_street_2",
                    "w_city",
                    "w_state",
                    "w_zip",
                ])
                .eq("w_id", w_id),
            Requirement::Row,
        )?;
        let w_name = text(&warehouse, 0, 0)?;
        self.update(
            &Update::table("warehouse")
                .set("w_ytd", SqlValue::expr(format!("w_ytd+{amount:.2}")))
                .eq("w_id", w_id),
        )?;

        let district = self.select(
            &Select::table("district")
                .columns([
                    "d_name",
                    "d_street_1",
                    "d_street_2",
                    "d_city",
                    "d_state",
                    "d_zip",
                ])
                .eq("d_w_id", w_id)
                .eq("d_id", d_id),
            Requirement::Row,
        )?;
        let d_name = text(&district, 0, 0)?;
        self.update(
            &Update::table("district")
                .set("d_ytd", SqlValue::expr(format!("d_ytd+{amount:.2}")))
                .eq("d_w_id", w_id)
                .eq("d_id", d_id),
        )?;

        let (customer, row) = self.find_customer(
            c_w_id,
            c_d_id,
            &params.customer,
            &[
                "c_id",
                "c_first",
                "c_last",
                "c_credit",
                "c_balance",
                "c_ytd_payment",
                "c_payment_cnt",
            ],
        )?;
        let c_id = int(&customer, row, 0)?;
        let credit = text(&customer, row, 3)?;
        let balance: f64 = number(&customer, row, 4)?;
        let ytd_payment: f64 = number(&customer, row, 5)?;
        let payment_cnt = int(&customer, row, 6)?;
        self.update(
            &Update::table("customer")
                .set("c_balance", balance - amount)
                .set("c_ytd_payment", ytd_payment + amount)
                .set("c_payment_cnt", payment_cnt + 1)
                .eq("c_w_id", c_w_id)
                .eq("c_d_id", c_d_id)
                .eq("c_id", c_id),
        )?;

        if credit == "BC" {
            let data = self.select(
                &Select::table("customer")
                    .columns(["c_data"])
                    .eq("c_w_id", c_w_id)
                    .eq("c_d_id", c_d_id)
                    .eq("c_id", c_id),
                Requirement::Row,
            )?;
            let previous = text(&data, 0, 0)?;
            let c_data: String =
                format!("{c_id} {c_d_id} {c_w_id} {d_id} {w_id} {amount:.2} {previous}")
                    .chars()
                    .take(500)
                    .collect();
            self.update(
                &Update::table("customer")
                    .set("c_data", c_data)
                    .eq("c_w_id", c_w_id)
                    .eq("c_d_id", c_d_id)
                    .eq("c_id", c_id),
            )?;
        }

        self.insert(
            &Insert::table("history")
                .value(c_id)
                .value(c_d_id)
                .value(c_w_id)
                .value(d_id)
                .value(w_id)
                .value(timestamp())
                .value(amount)
                .value(format!("{w_name}    {d_name}")),
        )?;
        self.commit()
    }

    fn order_status(&mut self, params: &OrderStatusParams) -> Step<()> {
        let OrderStatusParams { w_id, d_id, .. } = *params;
        self.begin()?;

        let (customer, row) = self.find_customer(
            w_id,
            d_id,
            &params.customer,
            &["c_id", "c_balance", "c_first", "c_middle", "c_last"],
        )?;
        let c_id = int(&customer, row, 0)?;

        let order = self.select(
            &Select::table("orders")
                .columns(["o_id", "o_entry_d", "o_carrier_id"])
                .eq("o_w_id", w_id)
                .eq("o_d_id", d_id)
                .eq("o_c_id", c_id)
                .order_by("o_id", Order::Desc),
            Requirement::Row,
        )?;
        let o_id = int(&order, 0, 0)?;

        let lines = self.select(
            &Select::table("order_line")
                .columns([
                    "ol_i_id",
                    "ol_supply_w_id",
                    "ol_quantity",
                    "ol_amount",
                    "ol_delivery_d",
                ])
                .eq("ol_w_id", w_id)
                .eq("ol_d_id", d_id)
                .eq("ol_o_id", o_id),
            Requirement::Any,
        )?;
        tracing::trace!(c_id, o_id, lines = lines.rows().len(), "order status");
        self.commit()
    }

    fn delivery(&mut self, params: &DeliveryParams) -> Step<()> {
        let DeliveryParams { w_id, carrier_id } = *params;
        self.begin()?;

        for d_id in 1..=DISTRICTS_PER_WAREHOUSE {
            let oldest = self.select(
                &Select::table("new_orders")
                    .columns(["min(no_o_id)"])
                    .eq("no_w_id", w_id)
                    .eq("no_d_id", d_id),
                Requirement::Any,
            )?;
            let Some(o_id) = oldest.scalar(0).and_then(parse_int) else {
                tracing::debug!(w_id, d_id, "no undelivered order, district skipped");
                continue;
            };

            let deleted = self.client.delete(
                &Delete::table("new_orders")
                    .eq("no_w_id", w_id)
                    .eq("no_d_id", d_id)
                    .eq("no_o_id", o_id),
            )?;
            check(deleted, Requirement::Any)?;

            let order = self.select(
                &Select::table("orders")
                    .columns(["o_c_id"])
                    .eq("o_w_id", w_id)
                    .eq("o_d_id", d_id)
                    .eq("o_id", o_id),
                Requirement::Row,
            )?;
            let c_id = int(&order, 0, 0)?;
            self.update(
                &Update::table("orders")
                    .set("o_carrier_id", carrier_id)
                    .eq("o_w_id", w_id)
                    .eq("o_d_id", d_id)
                    .eq("o_id", o_id),
            )?;
            self.update(
                &Update::table("order_line")
                    .set("ol_delivery_d", timestamp())
                    .eq("ol_w_id", w_id)
                    .eq("ol_d_id", d_id)
                    .eq("ol_o_id", o_id),
            )?;

            let sum = self.select(
                &Select::table("order_line")
                    .columns(["sum(ol_amount)"])
                    .eq("ol_w_id", w_id)
                    .eq("ol_d_id", d_id)
                    .eq("ol_o_id", o_id),
                Requirement::Any,
            )?;
            let amount = sum
                .scalar(0)
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .unwrap_or(0.0);

            let customer = self.select(
                &Select::table("customer")
                    .columns(["c_balance", "c_delivery_cnt"])
                    .eq("c_w_id", w_id)
                    .eq("c_d_id", d_id)
                    .eq("c_id", c_id),
                Requirement::Row,
            )?;
            let balance: f64 = number(&customer, 0, 0)?;
            let delivery_cnt = int(&customer, 0, 1)?;
            self.update(
                &Update::table("customer")
                    .set("c_balance", balance + amount)
                    .set("c_delivery_cnt", delivery_cnt + 1)
                    .eq("c_w_id", w_id)
                    .eq("c_d_id", d_id)
                    .eq("c_id", c_id),
            )?;
        }
        self.commit()
    }

    fn stock_level(&mut self, params: &StockLevelParams) -> Step<()> {
        let StockLevelParams {
            w_id,
            d_id,
            threshold,
        } = *params;
        self.begin()?;

        let district = self.select(
            &Select::table("district")
                .columns(["d_next_o_id"])
                .eq("d_w_id", w_id)
                .eq("d_id", d_id),
            Requirement::Row,
        )?;
        let next_o_id = int(&district, 0, 0)?;

        let lines = self.select(
            &Select::table("order_line")
                .columns(["ol_i_id"])
                .eq("ol_w_id", w_id)
                .eq("ol_d_id", d_id)
                .filter(Predicate::new("ol_o_id", Op::Ge, next_o_id - 20))
                .filter(Predicate::new("ol_o_id", Op::Lt, next_o_id)),
            Requirement::Any,
        )?;
        let items: HashSet<i64> = lines
            .rows()
            .iter()
            .filter_map(|row| row.first().and_then(|cell| parse_int(cell)))
            .collect();

        let mut low_stock = 0_usize;
        for item in items {
            let stock = self.select(
                &Select::table("stock")
                    .columns(["s_quantity"])
                    .eq("s_i_id", item)
                    .eq("s_w_id", w_id)
                    .filter(Predicate::new("s_quantity", Op::Lt, threshold)),
                Requirement::Any,
            )?;
            if !stock.rows().is_empty() {
                low_stock += 1;
            }
        }
        tracing::debug!(w_id, d_id, threshold, low_stock, "stock level");
        self.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_policy() {
        assert_eq!(next_stock_quantity(25, 10), 15);
        assert_eq!(next_stock_quantity(15, 10), 96);
        assert_eq!(next_stock_quantity(8, 10), 89);
        assert_eq!(next_stock_quantity(20, 10), 10);
        assert_eq!(next_stock_quantity(19, 10), 100);
    }

    #[test]
    fn test_middle_namesake() {
        assert_eq!(middle(1), 0);
        assert_eq!(middle(2), 1);
        assert_eq!(middle(3), 1);
        assert_eq!(middle(4), 2);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("3001"), Some(3001));
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("15.0"), Some(15));
        assert_eq!(parse_int("15.5"), None);
        assert_eq!(parse_int("NULL"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Termination::Completed.exit_code(), 0);
        assert_eq!(Termination::Fatal("boom".into()).exit_code(), 2);
        assert_eq!(Termination::Cancelled.exit_code(), 3);
    }
}
