//! Database clients for the TPC-C harness.
//!
//! Every backend implements [`DbClient`], a uniform capability surface of
//! `connect`, `close` and `execute` plus transaction-control and
//! SQL-building conveniences layered on `execute`. The workload engine,
//! the loader and the consistency checker depend on nothing else.
//!
//! Backends:
//!
//! - [`target::TargetClient`] -- the system under test, over the
//!   NUL-framed text protocol of [`wire`].
//! - [`reference::ReferenceClient`] -- an embedded SQLite database used to
//!   cross-validate the workload.
//! - [`file::SqlFileClient`] / [`file::SltFileClient`] -- record statements
//!   to disk without executing them.
//!
//! Cross-cutting behavior is added by wrapping a client in the interceptors
//! of [`middleware`]: the execution ledger and the cross-worker lock.
//! [`open_client`] assembles the full stack from a [`ClientConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tpcc_core::{QueryResult, ServerState};
use typed_builder::TypedBuilder;

pub mod error;
pub mod file;
pub mod ledger;
pub mod middleware;
pub mod reference;
pub mod sql;
pub mod target;
pub mod wire;

pub use error::Error;

use self::sql::{Delete, Insert, Select, Update};

/// Statement sent by [`DbClient::begin`].
pub const BEGIN: &str = "BEGIN;";
/// Statement sent by [`DbClient::commit`].
pub const COMMIT: &str = "COMMIT;";
/// Statement sent by [`DbClient::abort`].
pub const ABORT: &str = "ABORT;";

/// A connection to a database backend.
///
/// `execute` never fails for SQL-level problems: a rejected statement, a
/// server-side abort or a broken socket are all reported through the state
/// of the returned [`QueryResult`]. It returns `Err` only when the client
/// itself cannot continue.
pub trait DbClient {
    /// Open the connection and probe it.
    fn connect(&mut self) -> ServerState;

    /// Close the connection. Closing twice is a no-op.
    fn close(&mut self);

    /// Execute one raw statement.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] on unrecoverable client-internal failures.
    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error>;

    /// Whether statements are actually run and return real rows.
    fn executes_statements(&self) -> bool {
        true
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn begin(&mut self) -> Result<QueryResult, Error> {
        self.execute(BEGIN)
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn commit(&mut self) -> Result<QueryResult, Error> {
        self.execute(COMMIT)
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn abort(&mut self) -> Result<QueryResult, Error> {
        self.execute(ABORT)
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn select(&mut self, query: &Select) -> Result<QueryResult, Error> {
        self.execute(&query.to_string())
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn insert(&mut self, stmt: &Insert) -> Result<QueryResult, Error> {
        self.execute(&stmt.to_string())
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn update(&mut self, stmt: &Update) -> Result<QueryResult, Error> {
        self.execute(&stmt.to_string())
    }

    /// # Errors
    ///
    /// See [`DbClient::execute`].
    fn delete(&mut self, stmt: &Delete) -> Result<QueryResult, Error> {
        self.execute(&stmt.to_string())
    }
}

impl<C: DbClient + ?Sized> DbClient for Box<C> {
    fn connect(&mut self) -> ServerState {
        (**self).connect()
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        (**self).execute(sql)
    }

    fn executes_statements(&self) -> bool {
        (**self).executes_statements()
    }
}

/// Backend selected at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientKind {
    /// The system under test over its socket protocol.
    Target,
    /// Embedded SQLite.
    Reference,
    /// Plain SQL dump.
    FileSql,
    /// sqllogictest dump.
    FileSlt,
}

impl ClientKind {
    /// Whether this backend answers queries.
    #[must_use]
    pub const fn executes_statements(self) -> bool {
        matches!(self, Self::Target | Self::Reference)
    }
}

/// Everything needed to build a client; shared by all workers of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct ClientConfig {
    #[builder(default = ClientKind::Target)]
    pub kind: ClientKind,
    #[builder(default = "127.0.0.1".to_owned(), setter(into))]
    pub host: String,
    #[builder(default = 8765)]
    pub port: u16,
    /// Database file of the reference engine.
    #[builder(default = PathBuf::from("tpcc.sqlite"), setter(into))]
    pub database: PathBuf,
    /// Directory receiving the dumps of the file clients.
    #[builder(default = PathBuf::from("outputs"), setter(into))]
    pub output_dir: PathBuf,
    /// Directory receiving one execution ledger per client, `logs` unless
    /// set. Opt out by setting the field to `None`.
    #[builder(default = Some(PathBuf::from("logs")), setter(into))]
    pub ledger_dir: Option<PathBuf>,
    /// Lock file serializing `execute` across all workers; `None` lets
    /// workers run concurrently.
    #[builder(default, setter(strip_option, into))]
    pub global_lock: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Build the backend described by `config`, wrapped in the interceptors it
/// asks for. `label` names the client instance in ledgers and dump files.
///
/// The client is returned unconnected.
///
/// # Errors
///
/// Returns an [`Error`] if a dump, ledger or lock file cannot be opened.
pub fn open_client(config: &ClientConfig, label: &str) -> Result<Box<dyn DbClient + Send>, Error> {
    let mut client: Box<dyn DbClient + Send> = match config.kind {
        ClientKind::Target => Box::new(target::TargetClient::new(config.host.clone(), config.port)),
        ClientKind::Reference => Box::new(reference::ReferenceClient::new(&config.database)),
        ClientKind::FileSql => Box::new(file::SqlFileClient::create(
            config.output_dir.join(format!("{label}.sql")),
        )?),
        ClientKind::FileSlt => Box::new(file::SltFileClient::create(
            config.output_dir.join(format!("{label}.slt")),
        )?),
    };
    if let Some(lock) = &config.global_lock {
        client = Box::new(middleware::Serialized::new(client, lock)?);
    }
    if let Some(dir) = &config.ledger_dir {
        let ledger = ledger::Ledger::create(dir.join(format!("{label}.log.sql")))?;
        client = Box::new(middleware::Logged::new(client, ledger, label));
    }
    tracing::debug!(kind = ?config.kind, label, "opened client");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlValue;

    /// Collects statements and answers every one with an empty result.
    #[derive(Default)]
    struct Recorder {
        statements: Vec<String>,
    }

    impl DbClient for Recorder {
        fn connect(&mut self) -> ServerState {
            ServerState::Ok
        }

        fn close(&mut self) {}

        fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
            self.statements.push(sql.to_owned());
            Ok(QueryResult::empty(""))
        }
    }

    #[test]
    fn test_conveniences_route_through_execute() {
        let mut client = Recorder::default();
        client.begin().unwrap();
        client
            .select(&Select::table("district").columns(["d_tax"]).eq("d_id", 1_u32))
            .unwrap();
        client
            .update(&Update::table("district").set("d_next_o_id", SqlValue::Int(5)))
            .unwrap();
        client
            .insert(&Insert::table("new_orders").value(1_u32))
            .unwrap();
        client
            .delete(&Delete::table("new_orders").eq("no_o_id", 1_u32))
            .unwrap();
        client.abort().unwrap();
        client.commit().unwrap();
        assert_eq!(
            client.statements,
            vec![
                "BEGIN;",
                "select d_tax from district where d_id=1;",
                "update district set d_next_o_id=5;",
                "insert into new_orders values (1);",
                "delete from new_orders where no_o_id=1;",
                "ABORT;",
                "COMMIT;",
            ]
        );
    }

    #[test]
    fn test_boxed_client_delegates() {
        let mut client: Box<dyn DbClient> = Box::new(Recorder::default());
        assert_eq!(client.connect(), ServerState::Ok);
        assert!(client.executes_statements());
        assert!(client.execute("show tables;").unwrap().is_ok());
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(ClientKind::Target.executes_statements());
        assert!(ClientKind::Reference.executes_statements());
        assert!(!ClientKind::FileSql.executes_statements());
        assert!(!ClientKind::FileSlt.executes_statements());
    }

    #[test]
    fn test_ledger_on_unless_opted_out() {
        assert_eq!(ClientConfig::default().ledger_dir, Some(PathBuf::from("logs")));

        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::builder()
            .kind(ClientKind::FileSql)
            .output_dir(dir.path().join("outputs"))
            .ledger_dir(dir.path().join("logs"))
            .build();
        open_client(&config, "w0").unwrap();
        assert!(dir.path().join("logs/w0.log.sql").is_file());

        let quiet = ClientConfig {
            ledger_dir: None,
            ..config
        };
        open_client(&quiet, "w1").unwrap();
        assert!(dir.path().join("outputs/w1.sql").is_file());
        assert!(!dir.path().join("logs/w1.log.sql").exists());
    }
}
