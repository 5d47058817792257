mod common;

use std::sync::atomic::AtomicBool;

use common::{prepare, query_int, reference_config, small_scale, ScriptedClient};
use tpcc_core::QueryResult;
use tpcc_drivers::DbClient;
use tpcc_workload::params::{
    CustomerSelector, DeliveryParams, NewOrderParams, OrderLine, OrderStatusParams, Params,
    PaymentParams, StockLevelParams,
};
use tpcc_workload::{BenchConfig, Engine, Error, Phase, Termination};

fn config(max_retries: u32) -> BenchConfig {
    BenchConfig::builder()
        .scale(small_scale())
        .max_retries(max_retries)
        .build()
}

/// A successful tabular answer.
fn table(columns: &[&str], rows: &[&[&str]]) -> QueryResult {
    QueryResult::ok(
        columns.iter().map(|column| (*column).to_owned()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
            .collect(),
        "",
    )
}

fn stock_level() -> Params {
    Params::StockLevel(StockLevelParams {
        w_id: 1,
        d_id: 1,
        threshold: 15,
    })
}

#[test]
fn test_server_abort_retry_is_bounded() {
    let (client, log) = ScriptedClient::new(|_| QueryResult::abort("abort"));
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(3), 0, &cancel);

    let err = engine.run_transaction(&stock_level()).unwrap_err();
    assert!(matches!(err, Error::RetryExhausted { attempts: 4, .. }), "{err}");
    assert_eq!(engine.records().len(), 4);
    assert!(engine.records().iter().all(|record| !record.succeeded));
    // The target already rolled back; no explicit abort is sent.
    assert_eq!(*log.borrow(), ["BEGIN;"; 4]);
}

#[test]
fn test_missing_row_sends_abort_and_retries() {
    let (client, log) = ScriptedClient::new(|_| QueryResult::empty(""));
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(1), 0, &cancel);

    let err = engine.run_transaction(&stock_level()).unwrap_err();
    assert!(matches!(err, Error::RetryExhausted { attempts: 2, .. }), "{err}");
    let log = log.borrow();
    assert_eq!(log.iter().filter(|sql| *sql == "ABORT;").count(), 2);
    assert_eq!(log.iter().filter(|sql| *sql == "BEGIN;").count(), 2);
}

#[test]
fn test_mandated_rollback_is_not_retried() {
    let (client, log) = ScriptedClient::new(|_| QueryResult::empty(""));
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(5), 0, &cancel);
    let params = Params::NewOrder(NewOrderParams {
        w_id: 1,
        d_id: 1,
        c_id: 1,
        lines: vec![OrderLine {
            i_id: 201,
            supply_w_id: 1,
            quantity: 3,
        }],
        rollback: true,
    });

    assert!(!engine.run_transaction(&params).unwrap());
    assert_eq!(engine.records().len(), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("ABORT;"));
}

#[test]
fn test_error_is_fatal_immediately() {
    let (client, _log) = ScriptedClient::new(|_| QueryResult::error("Error: syntax"));
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(64), 0, &cancel);

    let err = engine.run_transaction(&stock_level()).unwrap_err();
    assert!(matches!(err, Error::Fatal { .. }), "{err}");
    assert_eq!(engine.records().len(), 1);
}

#[test]
fn test_cancel_stops_between_transactions() {
    let (client, log) = ScriptedClient::new(|_| QueryResult::empty(""));
    let cancel = AtomicBool::new(true);
    let mut engine = Engine::new(client, &config(64), 0, &cancel);

    let termination = engine.run(Phase::ReadWrite, 10, |_| {}).unwrap();
    assert_eq!(termination, Termination::Cancelled);
    assert!(engine.records().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_payment_picks_middle_namesake() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 7);
    let mut setup = prepare(&config);
    for (c_id, first) in [(5, "C"), (6, "A"), (7, "B")] {
        let sql = format!(
            "update customer set c_last='ZZZ', c_first='{first}', c_credit='GC' \
             where c_w_id=1 and c_d_id=1 and c_id={c_id};"
        );
        assert!(setup.execute(&sql).unwrap().is_ok());
    }

    let client = tpcc_drivers::open_client(&config.client, "payment").unwrap();
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config, 0, &cancel);
    assert_eq!(engine.connect(), tpcc_core::ServerState::Ok);
    let params = Params::Payment(PaymentParams {
        w_id: 1,
        d_id: 1,
        c_w_id: 1,
        c_d_id: 1,
        customer: CustomerSelector::LastName("ZZZ".to_owned()),
        amount: 10.0,
    });
    assert!(engine.run_transaction(&params).unwrap());
    engine.close();

    let count = |setup: &mut Box<dyn DbClient + Send>, c_id: u32| {
        query_int(
            setup,
            &format!(
                "select c_payment_cnt from customer where c_w_id=1 and c_d_id=1 and c_id={c_id};"
            ),
        )
    };
    assert_eq!(count(&mut setup, 7), 2);
    assert_eq!(count(&mut setup, 5), 1);
    assert_eq!(count(&mut setup, 6), 1);

    let history = query_int(
        &mut setup,
        "select count(*) from history where h_c_w_id=1 and h_c_d_id=1 and h_c_id=7;",
    );
    assert_eq!(history, 2);
}

#[test]
fn test_delivery_skips_empty_district() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 9);
    let mut setup = prepare(&config);
    assert!(setup
        .execute("delete from new_orders where no_w_id=1 and no_d_id=1;")
        .unwrap()
        .is_ok());

    let client = tpcc_drivers::open_client(&config.client, "delivery").unwrap();
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config, 0, &cancel);
    assert_eq!(engine.connect(), tpcc_core::ServerState::Ok);
    let params = Params::Delivery(DeliveryParams {
        w_id: 1,
        carrier_id: 4,
    });
    assert!(engine.run_transaction(&params).unwrap());
    engine.close();

    let remaining = query_int(
        &mut setup,
        "select count(*) from new_orders where no_w_id=1 and no_d_id=2;",
    );
    assert_eq!(remaining, 8);
    let oldest = query_int(
        &mut setup,
        "select min(no_o_id) from new_orders where no_w_id=1 and no_d_id=2;",
    );
    assert_eq!(oldest, 23);
    let carrier = query_int(
        &mut setup,
        "select o_carrier_id from orders where o_w_id=1 and o_d_id=2 and o_id=22;",
    );
    assert_eq!(carrier, 4);
}

#[test]
fn test_order_status_reads_latest_order_of_middle_namesake() {
    let (client, log) = ScriptedClient::new(|sql| {
        if sql.starts_with("select c_id,") {
            let columns = ["c_id", "c_balance", "c_first", "c_middle", "c_last"];
            table(
                &columns,
                &[
                    &["21", "-10.0", "ALPHA", "OE", "BARBARBAR"],
                    &["22", "-10.0", "BRAVO", "OE", "BARBARBAR"],
                    &["23", "-10.0", "CHARLIE", "OE", "BARBARBAR"],
                ],
            )
        } else if sql.starts_with("select o_id,") {
            table(
                &["o_id", "o_entry_d", "o_carrier_id"],
                &[&["3001", "2026-10-18 12:00:00", "0"], &["2990", "2026-10-17 12:00:00", "3"]],
            )
        } else {
            QueryResult::empty("")
        }
    });
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(0), 0, &cancel);
    let params = Params::OrderStatus(OrderStatusParams {
        w_id: 1,
        d_id: 2,
        customer: CustomerSelector::LastName("BARBARBAR".to_owned()),
    });
    assert!(engine.run_transaction(&params).unwrap());

    assert_eq!(
        *log.borrow(),
        [
            "BEGIN;",
            "select c_id,c_balance,c_first,c_middle,c_last from customer \
             where c_w_id=1 and c_d_id=2 and c_last='BARBARBAR' order by c_first asc;",
            "select o_id,o_entry_d,o_carrier_id from orders \
             where o_w_id=1 and o_d_id=2 and o_c_id=22 order by o_id desc;",
            "select ol_i_id,ol_supply_w_id,ol_quantity,ol_amount,ol_delivery_d from order_line \
             where ol_w_id=1 and ol_d_id=2 and ol_o_id=3001;",
            "COMMIT;",
        ]
    );
}

#[test]
fn test_stock_level_checks_each_recent_item_once() {
    let (client, log) = ScriptedClient::new(|sql| {
        if sql.starts_with("select d_next_o_id ") {
            table(&["d_next_o_id"], &[&["3021"]])
        } else if sql.starts_with("select ol_i_id ") {
            table(&["ol_i_id"], &[&["7"], &["7"], &["8"]])
        } else if sql.starts_with("select s_quantity ") {
            table(&["s_quantity"], &[&["12"]])
        } else {
            QueryResult::empty("")
        }
    });
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config(0), 0, &cancel);
    assert!(engine.run_transaction(&stock_level()).unwrap());

    let log = log.borrow();
    assert!(log.contains(
        &"select ol_i_id from order_line \
          where ol_w_id=1 and ol_d_id=1 and ol_o_id>=3001 and ol_o_id<3021;"
            .to_owned()
    ));
    let mut stock: Vec<&str> = log
        .iter()
        .filter(|sql| sql.starts_with("select s_quantity "))
        .map(String::as_str)
        .collect();
    stock.sort_unstable();
    assert_eq!(
        stock,
        [
            "select s_quantity from stock where s_i_id=7 and s_w_id=1 and s_quantity<15;",
            "select s_quantity from stock where s_i_id=8 and s_w_id=1 and s_quantity<15;",
        ]
    );
    assert_eq!(log.last().map(String::as_str), Some("COMMIT;"));
}

#[test]
fn test_new_order_updates_stock_and_district() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = reference_config(dir.path(), 11);
    config.scale.warehouses = 2;
    let mut setup = prepare(&config);
    for (i_id, w_id, quantity) in [(5, 2, 15), (6, 1, 40)] {
        let sql = format!(
            "update stock set s_quantity={quantity} where s_i_id={i_id} and s_w_id={w_id};"
        );
        assert!(setup.execute(&sql).unwrap().is_ok());
    }

    let client = tpcc_drivers::open_client(&config.client, "new-order").unwrap();
    let cancel = AtomicBool::new(false);
    let mut engine = Engine::new(client, &config, 0, &cancel);
    assert_eq!(engine.connect(), tpcc_core::ServerState::Ok);
    let params = Params::NewOrder(NewOrderParams {
        w_id: 1,
        d_id: 1,
        c_id: 1,
        lines: vec![
            OrderLine {
                i_id: 5,
                supply_w_id: 2,
                quantity: 10,
            },
            OrderLine {
                i_id: 6,
                supply_w_id: 1,
                quantity: 10,
            },
        ],
        rollback: false,
    });
    assert!(engine.run_transaction(&params).unwrap());
    engine.close();

    let mut stock = |column: &str, i_id: u32, w_id: u32| {
        query_int(
            &mut setup,
            &format!("select {column} from stock where s_i_id={i_id} and s_w_id={w_id};"),
        )
    };
    // 15 - 10 falls below 10, so the shelf is restocked by 91.
    assert_eq!(stock("s_quantity", 5, 2), 96);
    assert_eq!(stock("s_remote_cnt", 5, 2), 1);
    assert_eq!(stock("s_order_cnt", 5, 2), 1);
    assert_eq!(stock("s_quantity", 6, 1), 30);
    assert_eq!(stock("s_remote_cnt", 6, 1), 0);

    let next = query_int(
        &mut setup,
        "select d_next_o_id from district where d_w_id=1 and d_id=1;",
    );
    assert_eq!(next, 32);
    let lines = query_int(
        &mut setup,
        "select count(*) from order_line where ol_w_id=1 and ol_d_id=1 and ol_o_id=31;",
    );
    assert_eq!(lines, 2);
    let queued = query_int(
        &mut setup,
        "select count(*) from new_orders where no_w_id=1 and no_d_id=1 and no_o_id=31;",
    );
    assert_eq!(queued, 1);
    let all_local = query_int(
        &mut setup,
        "select o_all_local from orders where o_w_id=1 and o_d_id=1 and o_id=31;",
    );
    assert_eq!(all_local, 0);
}
