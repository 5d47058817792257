//! Schema management and bulk loading through the ordinary client surface.
//!
//! Everything here runs sequentially on one client before (or instead of)
//! the workload; every statement must come back `OK`.

use std::fs;
use std::path::Path;

use tpcc_core::{QueryResult, Scale, ServerState};
use tpcc_drivers::sql::Select;
use tpcc_drivers::DbClient;

use crate::engine::parse_int;
use crate::population::Population;
use crate::schema::{CREATE_INDEXES, CREATE_TABLES, DROP_TABLES, TABLES};
use crate::Error;

fn accept(result: QueryResult) -> Result<QueryResult, Error> {
    if result.state() == ServerState::Ok {
        Ok(result)
    } else {
        Err(Error::Rejected { result })
    }
}

/// Create the nine tables.
///
/// # Errors
///
/// Fails on the first rejected statement.
pub fn build<C: DbClient + ?Sized>(client: &mut C) -> Result<(), Error> {
    tracing::info!("creating tables");
    for sql in CREATE_TABLES {
        accept(client.execute(sql)?)?;
    }
    Ok(())
}

/// Create the key-column index of every table but `history`. Run after
/// loading so the bulk inserts do not maintain them.
///
/// # Errors
///
/// Fails on the first rejected statement.
pub fn create_indexes<C: DbClient + ?Sized>(client: &mut C) -> Result<(), Error> {
    tracing::info!(indexes = CREATE_INDEXES.len(), "creating indexes");
    for sql in CREATE_INDEXES {
        accept(client.execute(sql)?)?;
    }
    Ok(())
}

/// Drop the nine tables. Rejections are logged and ignored so that a
/// partially built schema can be cleaned.
///
/// # Errors
///
/// Fails only if the client itself breaks down.
pub fn drop_all<C: DbClient + ?Sized>(client: &mut C) -> Result<(), Error> {
    tracing::info!("dropping tables");
    for sql in DROP_TABLES {
        let result = client.execute(sql)?;
        if result.state() != ServerState::Ok {
            tracing::warn!(%result, "drop ignored");
        }
    }
    Ok(())
}

/// Execute every `;`-terminated statement of `script` in order. Returns the
/// number of statements sent.
///
/// # Errors
///
/// Fails on the first rejected statement.
pub fn send_script<C: DbClient + ?Sized>(client: &mut C, script: &str) -> Result<usize, Error> {
    let mut sent = 0;
    for statement in script.split(';').map(str::trim).filter(|piece| !piece.is_empty()) {
        accept(client.execute(&format!("{statement};"))?)?;
        sent += 1;
    }
    Ok(sent)
}

/// # Errors
///
/// Fails if the file cannot be read or a statement is rejected.
pub fn send_file<C: DbClient + ?Sized>(client: &mut C, path: &Path) -> Result<usize, Error> {
    let script = fs::read_to_string(path)?;
    let sent = send_script(client, &script)?;
    tracing::info!(path = %path.display(), statements = sent, "sent sql file");
    Ok(sent)
}

/// Send every `*.sql` file of `dir`, in file name order.
///
/// # Errors
///
/// Fails if the directory cannot be listed, a file cannot be read or a
/// statement is rejected.
pub fn send_dir<C: DbClient + ?Sized>(client: &mut C, dir: &Path) -> Result<usize, Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    let mut sent = 0;
    for file in &files {
        sent += send_file(client, file)?;
    }
    Ok(sent)
}

/// Generate and insert the initial population of `scale`. Returns the
/// number of rows inserted.
///
/// # Errors
///
/// Fails on the first rejected insert.
pub fn load_population<C: DbClient + ?Sized>(
    client: &mut C,
    scale: &Scale,
    seed: u64,
) -> Result<u64, Error> {
    tracing::info!(warehouses = scale.warehouses, seed, "loading initial population");
    let mut rows = 0_u64;
    let mut current = "";
    Population::new(*scale, seed).generate(|table, insert| {
        if table != current {
            tracing::debug!(table, "loading table");
            current = table;
        }
        accept(client.insert(&insert)?)?;
        rows += 1;
        Ok::<_, Error>(())
    })?;
    tracing::info!(rows, "initial population loaded");
    Ok(rows)
}

/// Compare each table's row count with what `scale` implies. Mismatches
/// are logged; returns whether every count matched.
///
/// `order_line` has no exact expectation and is only logged.
///
/// # Errors
///
/// Fails only if the client itself breaks down.
pub fn count_star<C: DbClient + ?Sized>(client: &mut C, scale: &Scale) -> Result<bool, Error> {
    let mut matched = true;
    for table in TABLES {
        let expected = match table {
            "item" => Some(u64::from(scale.items)),
            "warehouse" => Some(u64::from(scale.warehouses)),
            "stock" => Some(scale.stock()),
            "district" => Some(scale.districts()),
            "customer" => Some(scale.customers()),
            "history" => Some(scale.history()),
            "orders" => Some(scale.orders()),
            "new_orders" => Some(scale.new_orders()),
            _ => None,
        };
        let result = client.select(&Select::table(table).columns(["count(*)"]))?;
        let count = result
            .scalar(0)
            .and_then(parse_int)
            .and_then(|count| u64::try_from(count).ok());
        match (count, expected) {
            (Some(count), Some(expected)) if count == expected => {
                tracing::debug!(table, count, "count matches");
            }
            (Some(count), None) => tracing::info!(table, count, "counted"),
            (count, expected) => {
                tracing::error!(table, ?count, ?expected, %result, "count mismatch");
                matched = false;
            }
        }
    }
    Ok(matched)
}
