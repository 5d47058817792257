//! Embedded SQLite backend used to cross-validate the workload.
//!
//! SQLite does not speak the target's dialect exactly, so transaction
//! control is translated: `BEGIN;` takes the write lock up front and
//! `ABORT;` becomes `ROLLBACK;`. The target's anonymous
//! `create index T(cols);` gets a derived name. Lock contention surfaces as
//! `SQLITE_BUSY`; the open transaction is rolled back before the result is
//! reported as `ABORT`, matching a target that aborts on conflict.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};
use tpcc_core::{QueryResult, Row, ServerState};

use crate::wire::render_table;
use crate::{DbClient, Error, ABORT, BEGIN, COMMIT};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One connection to a SQLite database file.
pub struct ReferenceClient {
    path: PathBuf,
    conn: Option<Connection>,
}

impl ReferenceClient {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            conn: None,
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "OFF")?;
        Ok(conn)
    }
}

fn translate(sql: &str) -> Cow<'_, str> {
    let trimmed = sql.trim();
    if trimmed.eq_ignore_ascii_case(BEGIN) {
        Cow::Borrowed("BEGIN IMMEDIATE;")
    } else if trimmed.eq_ignore_ascii_case(ABORT) {
        Cow::Borrowed("ROLLBACK;")
    } else if trimmed.eq_ignore_ascii_case(COMMIT) {
        Cow::Borrowed("COMMIT;")
    } else if let Some(index) = named_index(trimmed) {
        Cow::Owned(index)
    } else {
        Cow::Borrowed(sql)
    }
}

/// `create index stock(s_w_id,s_i_id);` becomes
/// `create index if not exists idx_stock_s_w_id_s_i_id on stock(s_w_id,s_i_id);`.
fn named_index(sql: &str) -> Option<String> {
    const PREFIX: &str = "create index ";
    if !sql.get(..PREFIX.len())?.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let (table, columns) = sql.get(PREFIX.len()..)?.split_once('(')?;
    let table = table.trim();
    if table.is_empty() || table.contains(char::is_whitespace) {
        return None;
    }
    let columns = columns.trim_end_matches(';').trim_end().strip_suffix(')')?;
    let suffix: Vec<&str> = columns.split(',').map(str::trim).collect();
    Some(format!(
        "create index if not exists idx_{table}_{} on {table}({columns});",
        suffix.join("_")
    ))
}

fn cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(s) | ValueRef::Blob(s) => String::from_utf8_lossy(s).into_owned(),
    }
}

fn run(conn: &Connection, sql: &str) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
    if columns.is_empty() {
        stmt.raw_execute()?;
        return Ok(QueryResult::empty(""));
    }
    let mut rows: Vec<Row> = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            cells.push(cell(row.get_ref(i)?));
        }
        rows.push(cells);
    }
    let raw = render_table(&columns, &rows);
    Ok(QueryResult::ok(columns, rows, raw))
}

fn is_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

impl DbClient for ReferenceClient {
    fn connect(&mut self) -> ServerState {
        match self.open() {
            Ok(conn) => {
                tracing::debug!(path = %self.path.display(), "opened reference database");
                self.conn = Some(conn);
                ServerState::Ok
            }
            Err(err) => {
                tracing::error!(path = %self.path.display(), %err, "failed to open reference database");
                ServerState::Down
            }
        }
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                tracing::warn!(%err, "closing reference database failed");
            }
        }
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        let Some(conn) = self.conn.as_ref() else {
            return Ok(QueryResult::down("not connected").with_sql(sql));
        };
        let result = match run(conn, &translate(sql)) {
            Ok(result) => result,
            Err(err) if is_conflict(&err) => {
                if !conn.is_autocommit() {
                    conn.execute_batch("ROLLBACK;")?;
                }
                tracing::debug!(%err, sql, "conflict, transaction rolled back");
                QueryResult::abort(format!("abort: {err}"))
            }
            Err(err) => {
                tracing::warn!(%err, sql, "statement failed");
                QueryResult::error(format!("Error: {err}"))
            }
        };
        Ok(result.with_sql(sql))
    }
}
