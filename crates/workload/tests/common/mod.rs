#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tpcc_core::{QueryResult, Scale, ServerState};
use tpcc_drivers::{open_client, ClientConfig, ClientKind, DbClient};
use tpcc_workload::{loader, BenchConfig};

/// Reduced cardinalities keeping every invariant meaningful.
pub const fn small_scale() -> Scale {
    Scale {
        warehouses: 1,
        customers_per_district: 30,
        items: 200,
        new_orders_per_district: 9,
    }
}

/// Answers every statement through `respond` and keeps a shared log of
/// the statements it received.
pub struct ScriptedClient<F> {
    respond: F,
    log: Rc<RefCell<Vec<String>>>,
}

impl<F: FnMut(&str) -> QueryResult> ScriptedClient<F> {
    pub fn new(respond: F) -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                respond,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl<F: FnMut(&str) -> QueryResult> DbClient for ScriptedClient<F> {
    fn connect(&mut self) -> ServerState {
        ServerState::Ok
    }

    fn close(&mut self) {}

    fn execute(&mut self, sql: &str) -> Result<QueryResult, tpcc_drivers::Error> {
        self.log.borrow_mut().push(sql.to_owned());
        Ok((self.respond)(sql).with_sql(sql))
    }
}

/// Configuration of a run against a SQLite database inside `dir`.
pub fn reference_config(dir: &Path, seed: u64) -> BenchConfig {
    BenchConfig::builder()
        .scale(small_scale())
        .seed(seed)
        .client(
            ClientConfig::builder()
                .kind(ClientKind::Reference)
                .database(dir.join("tpcc.sqlite"))
                .ledger_dir(dir.join("logs"))
                .build(),
        )
        .build()
}

/// Create the schema and load the initial population of `config`.
pub fn prepare(config: &BenchConfig) -> Box<dyn DbClient + Send> {
    let mut client = open_client(&config.client, "loader").unwrap();
    assert_eq!(client.connect(), ServerState::Ok);
    loader::build(&mut client).unwrap();
    loader::load_population(&mut client, &config.scale, config.seed).unwrap();
    assert!(loader::count_star(&mut client, &config.scale).unwrap());
    client
}

/// Integer answer of a single-cell query.
pub fn query_int<C: DbClient + ?Sized>(client: &mut C, sql: &str) -> i64 {
    let result = client.execute(sql).unwrap();
    result
        .scalar(0)
        .unwrap_or_else(|| panic!("no value for {sql}: {result}"))
        .parse()
        .unwrap()
}
