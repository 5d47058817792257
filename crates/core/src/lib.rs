//! Shared vocabulary of the TPC-C harness.
//!
//! `tpcc_core` holds the types that every other crate of the harness
//! speaks:
//!
//! 1. **Protocol layer** -- [`QueryResult`] and its [`ServerState`]
//!    (`OK`, `DOWN`, `ABORT`, `ERROR`), produced by every database client
//!    for every executed command.
//! 2. **Transaction layer** -- [`Outcome`] (`Ok`, `ClientAbort`,
//!    `ServerAbort`, `Error`) and the pure [`classify()`] function mapping a
//!    statement result to an outcome.
//! 3. **Records** -- one [`TransactionRecord`] per attempted transaction,
//!    tagged with its [`TransactionKind`].
//! 4. **Scale** -- the warehouse-derived table cardinalities ([`Scale`])
//!    shared by the loader, the parameter generators and the consistency
//!    checker.
//! 5. **Statistics** -- merging of per-worker records and the derived
//!    per-kind rollback rates and tpmC ([`stats`]).
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on the public
//!   types, which worker processes use to stream records back.

pub mod outcome;
pub mod record;
pub mod result;
pub mod scale;
pub mod stats;

pub use outcome::{classify, Outcome, Requirement};
pub use record::{TransactionKind, TransactionRecord};
pub use result::{QueryResult, Row, ServerState};
pub use scale::Scale;
pub use stats::Summary;
