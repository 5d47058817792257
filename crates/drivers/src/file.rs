//! Clients that write statements to disk instead of executing them.
//!
//! Both answer every statement with an empty `OK`, so they can drive the
//! schema builder and the population loader to produce a script, but not
//! the workload, which needs real rows.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tpcc_core::{QueryResult, ServerState};

use crate::{DbClient, Error};

fn create_file(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn flush_and_close(path: &Path, out: &mut Option<BufWriter<File>>) {
    if let Some(mut writer) = out.take() {
        if let Err(err) = writer.flush() {
            tracing::warn!(path = %path.display(), %err, "flushing dump failed");
        }
    }
}

/// Plain SQL script, one statement per line.
pub struct SqlFileClient {
    path: PathBuf,
    out: Option<BufWriter<File>>,
}

impl SqlFileClient {
    /// # Errors
    ///
    /// Propagates file-system errors.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let out = create_file(&path)?;
        tracing::info!(path = %path.display(), "writing sql dump");
        Ok(Self {
            path,
            out: Some(out),
        })
    }
}

impl DbClient for SqlFileClient {
    fn connect(&mut self) -> ServerState {
        if self.out.is_some() {
            ServerState::Ok
        } else {
            ServerState::Down
        }
    }

    fn close(&mut self) {
        flush_and_close(&self.path, &mut self.out);
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        let out = self.out.as_mut().ok_or(Error::NotConnected)?;
        writeln!(out, "{}", sql.trim_end())?;
        Ok(QueryResult::empty("").with_sql(sql))
    }

    fn executes_statements(&self) -> bool {
        false
    }
}

/// sqllogictest script. Queries become `query` records with no expected
/// output, everything else a `statement ok` record.
pub struct SltFileClient {
    path: PathBuf,
    out: Option<BufWriter<File>>,
}

impl SltFileClient {
    /// # Errors
    ///
    /// Propagates file-system errors.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let out = create_file(&path)?;
        tracing::info!(path = %path.display(), "writing sqllogictest dump");
        Ok(Self {
            path,
            out: Some(out),
        })
    }
}

fn is_query(sql: &str) -> bool {
    let head = sql.trim_start().split_whitespace().next().unwrap_or("");
    head.eq_ignore_ascii_case("select") || head.eq_ignore_ascii_case("show")
}

fn slt_record(sql: &str) -> String {
    let sql = sql.trim();
    if is_query(sql) {
        format!("query T\n{sql}\n----\n\n")
    } else {
        format!("statement ok\n{sql}\n\n")
    }
}

impl DbClient for SltFileClient {
    fn connect(&mut self) -> ServerState {
        if self.out.is_some() {
            ServerState::Ok
        } else {
            ServerState::Down
        }
    }

    fn close(&mut self) {
        flush_and_close(&self.path, &mut self.out);
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        let out = self.out.as_mut().ok_or(Error::NotConnected)?;
        out.write_all(slt_record(sql).as_bytes())?;
        Ok(QueryResult::empty("").with_sql(sql))
    }

    fn executes_statements(&self) -> bool {
        false
    }
}
