//! Interceptors wrapping any [`DbClient`].

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use tpcc_core::{QueryResult, ServerState};

use crate::ledger::Ledger;
use crate::{DbClient, Error};

/// Appends every statement and its result to a [`Ledger`].
pub struct Logged<C> {
    inner: C,
    ledger: Ledger,
    label: String,
}

impl<C: DbClient> Logged<C> {
    pub fn new(inner: C, ledger: Ledger, label: impl Into<String>) -> Self {
        Self {
            inner,
            ledger,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: DbClient> DbClient for Logged<C> {
    fn connect(&mut self) -> ServerState {
        self.inner.connect()
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        let result = self.inner.execute(sql)?;
        if let Err(err) = self.ledger.record(sql, &result) {
            tracing::error!(label = %self.label, path = %self.ledger.path().display(), %err, "ledger write failed");
            return Err(err.into());
        }
        Ok(result)
    }

    fn executes_statements(&self) -> bool {
        self.inner.executes_statements()
    }
}

/// Holds an exclusive lock on a shared file for the duration of every
/// `execute`, so that at most one statement across all workers (threads or
/// processes) is in flight at a time.
pub struct Serialized<C> {
    inner: C,
    lock: File,
}

impl<C: DbClient> Serialized<C> {
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened.
    pub fn new(inner: C, lock_path: &Path) -> Result<Self, Error> {
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;
        Ok(Self { inner, lock })
    }
}

impl<C: DbClient> DbClient for Serialized<C> {
    fn connect(&mut self) -> ServerState {
        self.inner.connect()
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        self.lock.lock()?;
        let result = self.inner.execute(sql);
        self.lock.unlock()?;
        result
    }

    fn executes_statements(&self) -> bool {
        self.inner.executes_statements()
    }
}
