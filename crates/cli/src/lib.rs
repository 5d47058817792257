//! tpcc CLI -- prepare a database and drive the TPC-C workload against it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tpcc_core::scale::{CUSTOMERS_PER_DISTRICT, ITEMS, NEW_ORDERS_PER_DISTRICT};
use tpcc_core::Scale;
use tpcc_drivers::{ClientConfig, ClientKind};
use tpcc_workload::{BenchConfig, Isolation};

#[derive(Debug, Parser)]
#[command(
    name = "tpcc",
    about = "TPC-C correctness and throughput harness for transactional SQL engines",
    args_conflicts_with_subcommands = true
)]
pub struct App {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one worker and stream its records to stdout as JSON lines
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Debug, Parser)]
pub struct WorkerArgs {
    /// Worker spec as JSON
    #[arg(long)]
    pub spec: String,
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Create the tables and load the initial population
    #[arg(long)]
    pub prepare: bool,
    /// Create the key-column indexes after loading (with --prepare)
    #[arg(long)]
    pub create_index: bool,
    /// Drop all tables (before --prepare when both are given)
    #[arg(long)]
    pub clean: bool,
    /// Total transactions of the read-write phase
    #[arg(long, default_value_t = 0)]
    pub rw: u64,
    /// Total transactions of the read-only phase
    #[arg(long, default_value_t = 0)]
    pub ro: u64,
    /// Number of concurrent workers
    #[arg(long, default_value_t = 1)]
    pub thread: usize,
    /// Database client
    #[arg(long, value_enum, default_value_t = ClientChoice::Target)]
    pub client: ClientChoice,
    /// Base seed; worker i uses seed + i
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Number of warehouses
    #[arg(long, default_value_t = 1)]
    pub warehouse: u32,
    /// Print latency extremes and the NewOrder timeline
    #[arg(long)]
    pub analyze: bool,
    /// Skip the consistency checks
    #[arg(long)]
    pub no_validate: bool,
    /// How workers are isolated from each other
    #[arg(long, value_enum, default_value_t = IsolationChoice::Process)]
    pub isolation: IsolationChoice,
    /// Host of the target server
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port of the target server
    #[arg(long, default_value_t = 8765)]
    pub port: u16,
    /// SQLite database of the reference client
    #[arg(long, default_value = "tpcc.sqlite")]
    pub database: PathBuf,
    /// Load `*.sql` files from this directory instead of generating data
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Directory of the per-client execution ledgers
    #[arg(long, default_value = "logs")]
    pub ledger_dir: PathBuf,
    /// Do not keep execution ledgers
    #[arg(long)]
    pub no_ledger: bool,
    /// Output directory of the file clients
    #[arg(long, default_value = "outputs")]
    pub output_dir: PathBuf,
    /// Retries per transaction before the worker gives up
    #[arg(long, default_value_t = 64)]
    pub max_retries: u32,
    /// Serialize every statement of every worker through this lock file
    #[arg(long)]
    pub global_lock: Option<PathBuf>,
    /// Customers (and initial orders) per district
    #[arg(long, default_value_t = CUSTOMERS_PER_DISTRICT)]
    pub customers: u32,
    /// Number of items
    #[arg(long, default_value_t = ITEMS)]
    pub items: u32,
    /// Undelivered orders per district after loading
    #[arg(long, default_value_t = NEW_ORDERS_PER_DISTRICT)]
    pub new_orders: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ClientChoice {
    Target,
    Reference,
    FileSql,
    FileSlt,
}

impl From<ClientChoice> for ClientKind {
    fn from(choice: ClientChoice) -> Self {
        match choice {
            ClientChoice::Target => Self::Target,
            ClientChoice::Reference => Self::Reference,
            ClientChoice::FileSql => Self::FileSql,
            ClientChoice::FileSlt => Self::FileSlt,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum IsolationChoice {
    Process,
    Thread,
}

impl From<IsolationChoice> for Isolation {
    fn from(choice: IsolationChoice) -> Self {
        match choice {
            IsolationChoice::Process => Self::Process,
            IsolationChoice::Thread => Self::Thread,
        }
    }
}

impl RunArgs {
    #[must_use]
    pub fn scale(&self) -> Scale {
        Scale {
            warehouses: self.warehouse,
            customers_per_district: self.customers,
            items: self.items,
            new_orders_per_district: self.new_orders,
        }
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            kind: self.client.into(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            output_dir: self.output_dir.clone(),
            ledger_dir: (!self.no_ledger).then(|| self.ledger_dir.clone()),
            global_lock: self.global_lock.clone(),
        }
    }

    /// The immutable configuration of the whole run.
    #[must_use]
    pub fn config(&self) -> BenchConfig {
        BenchConfig::builder()
            .scale(self.scale())
            .seed(self.seed)
            .max_retries(self.max_retries)
            .client(self.client_config())
            .validate(!self.no_validate)
            .isolation(self.isolation.into())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let app = App::parse_from(["tpcc"]);
        assert!(app.command.is_none());
        assert!(!app.run.create_index);
        let config = app.run.config();
        assert_eq!(config.scale, Scale::standard(1));
        assert_eq!(config.max_retries, 64);
        assert_eq!(config.isolation, Isolation::Process);
        assert_eq!(config.client.kind, ClientKind::Target);
        assert!(config.validate);
        assert_eq!(config.client.ledger_dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn test_run_flags() {
        let app = App::parse_from([
            "tpcc",
            "--prepare",
            "--create-index",
            "--rw",
            "100",
            "--thread",
            "4",
            "--client",
            "file-slt",
            "--warehouse",
            "2",
            "--no-validate",
            "--no-ledger",
            "--global-lock",
            "/tmp/tpcc.lock",
        ]);
        assert!(app.run.prepare);
        assert!(app.run.create_index);
        assert_eq!(app.run.rw, 100);
        assert_eq!(app.run.thread, 4);
        let config = app.run.config();
        assert_eq!(config.client.kind, ClientKind::FileSlt);
        assert_eq!(config.scale.warehouses, 2);
        assert!(!config.validate);
        assert!(config.serialized());
        assert!(config.client.ledger_dir.is_none());
    }

    #[test]
    fn test_hidden_worker_subcommand() {
        let app = App::parse_from(["tpcc", "worker", "--spec", "{}"]);
        match app.command {
            Some(Command::Worker(args)) => assert_eq!(args.spec, "{}"),
            None => panic!("worker subcommand not parsed"),
        }
    }
}
