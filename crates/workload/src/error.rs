use derive_more::{Display, Error, From};
use tpcc_core::scale::ScaleError;
use tpcc_core::{QueryResult, TransactionKind};

/// Failure that stops a worker or the whole run.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The database client itself broke down.
    #[display("client failure: {_0}")]
    Client(tpcc_drivers::Error),
    /// A statement ended in `ERROR` or `DOWN` inside a transaction.
    #[from(skip)]
    #[display("{kind} failed: {result}")]
    Fatal {
        kind: TransactionKind,
        result: QueryResult,
    },
    /// A transaction kept aborting beyond the retry budget.
    #[from(skip)]
    #[display("{kind} still aborting after {attempts} attempts")]
    RetryExhausted {
        kind: TransactionKind,
        attempts: u32,
    },
    /// A schema or load statement was rejected.
    #[from(skip)]
    #[display("statement rejected: {result}")]
    Rejected { result: QueryResult },
    /// A connection could not be established.
    #[from(skip)]
    #[display("{label} could not connect")]
    Down { label: String },
    #[display("i/o error: {_0}")]
    Io(std::io::Error),
    #[from(skip)]
    #[display("failed to launch worker {worker}: {source}")]
    Spawn {
        worker: usize,
        source: std::io::Error,
    },
    #[from(skip)]
    #[display("worker {worker}: {reason}")]
    WorkerProtocol { worker: usize, reason: String },
    #[display("json error: {_0}")]
    Json(serde_json::Error),
    #[display("thread pool error: {_0}")]
    Pool(rayon::ThreadPoolBuildError),
    #[display("transaction mix: {_0}")]
    Weights(rand::distr::weighted::Error),
    #[display("invalid scale: {_0}")]
    Scale(ScaleError),
    #[from(skip)]
    #[display("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
