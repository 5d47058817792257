//! Read-only validation of the TPC-C relational invariants.
//!
//! The checks must only run while no worker is writing: before the
//! workload starts and after every worker has stopped. They never fail the
//! run; every broken invariant becomes a [`Violation`] in the returned
//! [`CheckReport`].

use core::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tpcc_core::scale::DISTRICTS_PER_WAREHOUSE;
use tpcc_core::{Scale, ServerState};
use tpcc_drivers::sql::Select;
use tpcc_drivers::DbClient;

use crate::engine::parse_int;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invariant {
    /// `d_next_o_id - 1 == max(o_id) == max(no_o_id)`.
    NextOrderId,
    /// `count(no_o_id) == max(no_o_id) - min(no_o_id) + 1`.
    NewOrderRange,
    /// `sum(o_ol_cnt) == count(order_line)`.
    OrderLines,
    /// Total orders equal the loaded orders plus committed NewOrders.
    OrderTotal,
    /// An aggregate could not be read at all.
    Unreadable,
}

impl Display for Invariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::NextOrderId => "district/orders/new_orders",
            Self::NewOrderRange => "new_orders contiguity",
            Self::OrderLines => "orders/order_line",
            Self::OrderTotal => "orders total",
            Self::Unreadable => "unreadable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub invariant: Invariant,
    pub w_id: Option<u32>,
    pub d_id: Option<u32>,
    pub detail: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.invariant)?;
        if let (Some(w_id), Some(d_id)) = (self.w_id, self.d_id) {
            write!(f, " (w_id={w_id}, d_id={d_id})")?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Result of one checker pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub name: String,
    pub violations: Vec<Violation>,
    /// Total `orders` rows seen, when the pass counted them.
    pub orders: Option<u64>,
}

impl CheckReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            violations: Vec::new(),
            orders: None,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    fn violate(&mut self, invariant: Invariant, district: Option<(u32, u32)>, detail: String) {
        let violation = Violation {
            invariant,
            w_id: district.map(|(w_id, _)| w_id),
            d_id: district.map(|(_, d_id)| d_id),
            detail,
        };
        tracing::error!(check = %self.name, %violation, "consistency violation");
        self.violations.push(violation);
    }
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.passed() {
            return write!(f, "{}: PASS", self.name);
        }
        write!(f, "{}: FAIL ({} violations)", self.name, self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// Runs aggregate queries over one client.
pub struct Checker<'c, C: ?Sized> {
    client: &'c mut C,
    scale: Scale,
}

impl<'c, C: DbClient + ?Sized> Checker<'c, C> {
    pub fn new(client: &'c mut C, scale: Scale) -> Self {
        Self { client, scale }
    }

    /// Single integer aggregate; `Ok(None)` for SQL `NULL` or no row.
    fn aggregate(&mut self, query: &Select) -> Result<Option<i64>, String> {
        let result = self.client.select(query).map_err(|err| err.to_string())?;
        if result.state() != ServerState::Ok {
            return Err(result.to_string());
        }
        match result.scalar(0).map(str::trim) {
            None | Some("" | "NULL" | "null") => Ok(None),
            Some(cell) => parse_int(cell).map(Some).ok_or_else(|| result.to_string()),
        }
    }

    fn district_aggregate(
        &mut self,
        table: &str,
        column: &str,
        w_id: u32,
        d_id: u32,
    ) -> Result<Option<i64>, String> {
        let (w_column, d_column) = match table {
            "district" => ("d_w_id", "d_id"),
            "orders" => ("o_w_id", "o_d_id"),
            "new_orders" => ("no_w_id", "no_d_id"),
            _ => ("ol_w_id", "ol_d_id"),
        };
        self.aggregate(
            &Select::table(table)
                .columns([column])
                .eq(w_column, w_id)
                .eq(d_column, d_id),
        )
    }

    fn districts(&self) -> Vec<(u32, u32)> {
        (1..=self.scale.warehouses)
            .flat_map(|w_id| (1..=DISTRICTS_PER_WAREHOUSE).map(move |d_id| (w_id, d_id)))
            .collect()
    }

    /// The three per-district invariants, plus the total `orders` count.
    pub fn consistency_check(&mut self) -> CheckReport {
        tracing::info!("consistency checking");
        let mut report = CheckReport::new("consistency_check");
        for (w_id, d_id) in self.districts() {
            if let Err(detail) = self.check_district(&mut report, w_id, d_id) {
                report.violate(Invariant::Unreadable, Some((w_id, d_id)), detail);
            }
        }
        match self.aggregate(&Select::table("orders").columns(["count(*)"])) {
            Ok(count) => report.orders = count.and_then(|count| u64::try_from(count).ok()),
            Err(detail) => report.violate(Invariant::Unreadable, None, detail),
        }
        if report.passed() {
            tracing::info!(orders = ?report.orders, "consistency check passed");
        }
        report
    }

    fn check_district(
        &mut self,
        report: &mut CheckReport,
        w_id: u32,
        d_id: u32,
    ) -> Result<(), String> {
        let district = Some((w_id, d_id));
        let next_o_id = self.district_aggregate("district", "d_next_o_id", w_id, d_id)?;
        let max_o_id = self.district_aggregate("orders", "max(o_id)", w_id, d_id)?;
        let max_no_o_id = self.district_aggregate("new_orders", "max(no_o_id)", w_id, d_id)?;
        let min_no_o_id = self.district_aggregate("new_orders", "min(no_o_id)", w_id, d_id)?;
        let count_no = self.district_aggregate("new_orders", "count(no_o_id)", w_id, d_id)?;
        let sum_ol_cnt = self.district_aggregate("orders", "sum(o_ol_cnt)", w_id, d_id)?;
        let count_ol = self.district_aggregate("order_line", "count(ol_o_id)", w_id, d_id)?;

        let last_o_id = next_o_id.map(|next| next - 1);
        // A fully delivered district has no new_orders row to compare.
        let new_orders_agree = max_no_o_id.is_none() || max_no_o_id == last_o_id;
        if last_o_id.is_none() || max_o_id != last_o_id || !new_orders_agree {
            report.violate(
                Invariant::NextOrderId,
                district,
                format!(
                    "d_next_o_id={next_o_id:?}, max(o_id)={max_o_id:?}, max(no_o_id)={max_no_o_id:?}"
                ),
            );
        }

        let count_no = count_no.unwrap_or(0);
        if let (Some(max), Some(min)) = (max_no_o_id, min_no_o_id) {
            if count_no != max - min + 1 {
                report.violate(
                    Invariant::NewOrderRange,
                    district,
                    format!("count(no_o_id)={count_no}, max(no_o_id)={max}, min(no_o_id)={min}"),
                );
            }
        } else if count_no != 0 {
            report.violate(
                Invariant::NewOrderRange,
                district,
                format!("count(no_o_id)={count_no} without max/min"),
            );
        }

        let sum_ol_cnt = sum_ol_cnt.unwrap_or(0);
        let count_ol = count_ol.unwrap_or(0);
        if sum_ol_cnt != count_ol {
            report.violate(
                Invariant::OrderLines,
                district,
                format!("sum(o_ol_cnt)={sum_ol_cnt}, count(ol_o_id)={count_ol}"),
            );
        }
        Ok(())
    }

    /// Total `orders` rows must equal `baseline` plus the committed
    /// NewOrders observed by the workers.
    pub fn consistency_check2(&mut self, baseline: u64, successful_new_orders: u64) -> CheckReport {
        tracing::info!(baseline, successful_new_orders, "consistency checking 2");
        let mut report = CheckReport::new("consistency_check2");
        let expected = baseline + successful_new_orders;
        match self.aggregate(&Select::table("orders").columns(["count(*)"])) {
            Ok(count) => {
                let count = count.and_then(|count| u64::try_from(count).ok());
                report.orders = count;
                if count != Some(expected) {
                    report.violate(
                        Invariant::OrderTotal,
                        None,
                        format!(
                            "count(*)={count:?}, expected {expected} ({baseline} loaded + {successful_new_orders} new)"
                        ),
                    );
                }
            }
            Err(detail) => report.violate(Invariant::Unreadable, None, detail),
        }
        if report.passed() {
            tracing::info!(orders = expected, "consistency check 2 passed");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use tpcc_core::QueryResult;

    use super::*;

    /// Answers aggregates from a fixed table keyed by the selected column.
    struct Canned {
        answers: Vec<(&'static str, &'static str)>,
    }

    impl DbClient for Canned {
        fn connect(&mut self) -> ServerState {
            ServerState::Ok
        }

        fn close(&mut self) {}

        fn execute(&mut self, sql: &str) -> Result<QueryResult, tpcc_drivers::Error> {
            let column = sql
                .strip_prefix("select ")
                .and_then(|rest| rest.split(" from ").next())
                .unwrap_or_default();
            let answer = self
                .answers
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, value)| *value);
            Ok(match answer {
                Some(value) => QueryResult::ok(
                    vec![column.to_owned()],
                    vec![vec![value.to_owned()]],
                    "",
                ),
                None => QueryResult::error("no answer"),
            })
        }
    }

    fn one_warehouse() -> Scale {
        Scale {
            warehouses: 1,
            customers_per_district: 30,
            items: 100,
            new_orders_per_district: 9,
        }
    }

    fn healthy() -> Vec<(&'static str, &'static str)> {
        vec![
            ("d_next_o_id", "31"),
            ("max(o_id)", "30"),
            ("max(no_o_id)", "30"),
            ("min(no_o_id)", "22"),
            ("count(no_o_id)", "9"),
            ("sum(o_ol_cnt)", "300"),
            ("count(ol_o_id)", "300"),
            ("count(*)", "300"),
        ]
    }

    fn with(answers: &[(&'static str, &'static str)]) -> Canned {
        let mut all = healthy();
        for &(column, value) in answers {
            all.retain(|(name, _)| *name != column);
            all.push((column, value));
        }
        Canned { answers: all }
    }

    #[test]
    fn test_healthy_database_passes() {
        let mut client = with(&[]);
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert!(report.passed(), "{report}");
        assert_eq!(report.orders, Some(300));
    }

    #[test]
    fn test_each_invariant_detected() {
        let mut client = with(&[("d_next_o_id", "32")]);
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert_eq!(report.violations.len(), 10);
        assert!(report
            .violations
            .iter()
            .all(|violation| violation.invariant == Invariant::NextOrderId));

        let mut client = with(&[("count(no_o_id)", "8")]);
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert_eq!(report.violations[0].invariant, Invariant::NewOrderRange);
        assert_eq!(report.violations[0].d_id, Some(1));

        let mut client = with(&[("count(ol_o_id)", "299")]);
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert_eq!(report.violations[0].invariant, Invariant::OrderLines);
    }

    #[test]
    fn test_delivered_district_passes() {
        let mut client = with(&[
            ("max(no_o_id)", "NULL"),
            ("min(no_o_id)", "NULL"),
            ("count(no_o_id)", "0"),
        ]);
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert!(report.passed(), "{report}");
    }

    #[test]
    fn test_unreadable_aggregate_reported() {
        let mut client = Canned { answers: vec![] };
        let report = Checker::new(&mut client, one_warehouse()).consistency_check();
        assert!(!report.passed());
        assert!(report
            .violations
            .iter()
            .all(|violation| violation.invariant == Invariant::Unreadable));
    }

    #[test]
    fn test_order_total() {
        let mut client = with(&[("count(*)", "312")]);
        let mut checker = Checker::new(&mut client, one_warehouse());
        assert!(checker.consistency_check2(300, 12).passed());
        let report = checker.consistency_check2(300, 11);
        assert!(!report.passed());
        assert_eq!(report.violations[0].invariant, Invariant::OrderTotal);
        assert!(report.to_string().starts_with("consistency_check2: FAIL"));
    }
}
