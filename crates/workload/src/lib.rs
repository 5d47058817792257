//! TPC-C workload engine, consistency checker and worker orchestration.
//!
//! The crate is organised bottom-up:
//!
//! 1. **Configuration** -- one immutable [`BenchConfig`] built at startup and
//!    handed to every component.
//! 2. **Parameters and mix** -- seeded per-worker generators ([`random`]),
//!    per-profile inputs ([`params`]) and the weighted choice of the next
//!    transaction kind ([`mix`]).
//! 3. **Engine** -- the five transaction profiles over any
//!    [`DbClient`](tpcc_drivers::DbClient), with classification and a
//!    bounded retry loop ([`engine`]).
//! 4. **Data** -- table definitions ([`schema`]), the deterministic initial
//!    population ([`population`]) and the loader sending both
//!    ([`loader`]).
//! 5. **Validation** -- the read-only invariant checks ([`checker`]).
//! 6. **Orchestration** -- the worker entry point ([`worker`]), thread and
//!    process launchers with the phase barrier ([`orchestrator`]), and the
//!    final [`BenchReport`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! use tpcc_drivers::{ClientConfig, ClientKind};
//! use tpcc_workload::orchestrator::{Orchestrator, ThreadLauncher};
//! use tpcc_workload::BenchConfig;
//!
//! let config = BenchConfig::builder()
//!     .seed(42)
//!     .client(ClientConfig::builder().kind(ClientKind::Reference).build())
//!     .build();
//! let cancel = Arc::new(AtomicBool::new(false));
//! let orchestrator = Orchestrator::new(config, 4, ThreadLauncher::new(cancel.clone()), cancel);
//! let report = orchestrator.run(1_000, 100).unwrap();
//! println!("{report}");
//! ```

pub mod checker;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod mix;
pub mod orchestrator;
pub mod params;
pub mod population;
pub mod random;
pub mod report;
pub mod schema;
pub mod worker;

pub use checker::{CheckReport, Checker};
pub use config::{BenchConfig, Isolation};
pub use engine::{Engine, Termination};
pub use error::Error;
pub use mix::Phase;
pub use report::BenchReport;
pub use worker::{WorkerReport, WorkerSpec};
