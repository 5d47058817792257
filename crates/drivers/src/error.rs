use derive_more::{Display, Error, From};

/// Client-internal failure.
///
/// SQL-level failures are never reported through this type; they are
/// encoded in the state of the returned [`QueryResult`](tpcc_core::QueryResult).
/// An `Error` means the client itself can no longer operate and the worker
/// owning it must stop.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Local I/O failed (ledger, dump file, lock file).
    #[display("i/o error: {_0}")]
    Io(std::io::Error),
    /// The embedded reference engine could not be opened.
    #[display("sqlite error: {_0}")]
    Sqlite(rusqlite::Error),
    /// A statement was issued before `connect` or after `close`.
    #[display("client is not connected")]
    NotConnected,
}
