//! Worker entry point.
//!
//! A worker owns one client connection, one [`Engine`] and one seeded
//! generator, and executes a fixed share of one phase. It is the same code
//! whether it runs on a thread of the orchestrator or in a child process;
//! a child streams its records back as JSON lines through
//! [`serve_worker`].

use std::io::Write;
use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tpcc_core::{ServerState, TransactionRecord};
use tpcc_drivers::open_client;

use crate::engine::{Engine, Termination};
use crate::mix::Phase;
use crate::{BenchConfig, Error};

/// Everything a worker needs; sent whole to worker processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub worker: usize,
    pub phase: Phase,
    /// Transactions to schedule, retries not included.
    pub transactions: u64,
    pub config: BenchConfig,
}

impl WorkerSpec {
    /// Client label, used to name ledgers and dump files.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.phase, self.worker)
    }
}

/// One line of a worker process's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMessage {
    Record(TransactionRecord),
    Done(Termination),
}

/// What a worker hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub phase: Phase,
    pub termination: Termination,
    pub records: Vec<TransactionRecord>,
}

impl WorkerReport {
    #[must_use]
    pub const fn failed(spec: &WorkerSpec, reason: String) -> Self {
        Self {
            worker: spec.worker,
            phase: spec.phase,
            termination: Termination::Fatal(reason),
            records: Vec::new(),
        }
    }
}

/// Run one worker to completion on a fresh client built from the spec's
/// configuration. Never fails: every failure becomes a
/// [`Termination::Fatal`] in the report, next to the records made before
/// it.
pub fn run_worker<F>(spec: &WorkerSpec, cancel: &AtomicBool, on_record: F) -> WorkerReport
where
    F: FnMut(&TransactionRecord),
{
    let label = spec.label();
    let span = tracing::info_span!("worker", worker = spec.worker, phase = %spec.phase);
    let _guard = span.enter();

    let client = match open_client(&spec.config.client, &label) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(%err, "cannot open client");
            return WorkerReport::failed(spec, Error::from(err).to_string());
        }
    };
    let mut engine = Engine::new(client, &spec.config, spec.worker, cancel);
    let termination = if engine.connect() == ServerState::Ok {
        tracing::info!(transactions = spec.transactions, "worker started");
        match engine.run(spec.phase, spec.transactions, on_record) {
            Ok(termination) => termination,
            Err(err) => {
                tracing::error!(%err, "worker terminated");
                Termination::Fatal(err.to_string())
            }
        }
    } else {
        Termination::Fatal(Error::Down { label }.to_string())
    };
    engine.close();

    let records = engine.into_records();
    tracing::info!(records = records.len(), ?termination, "worker stopped");
    WorkerReport {
        worker: spec.worker,
        phase: spec.phase,
        termination,
        records,
    }
}

fn write_message<W: Write>(out: &mut W, message: &WorkerMessage) -> Result<(), Error> {
    serde_json::to_writer(&mut *out, message)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Body of a worker process: run `spec` and stream every record, then the
/// termination, to `out` as JSON lines.
///
/// # Errors
///
/// Returns an error if the stream cannot be written.
pub fn serve_worker<W: Write>(
    spec: &WorkerSpec,
    cancel: &AtomicBool,
    mut out: W,
) -> Result<Termination, Error> {
    let mut broken = None;
    let report = run_worker(spec, cancel, |record| {
        if broken.is_none() {
            broken = write_message(&mut out, &WorkerMessage::Record(record.clone())).err();
        }
    });
    if let Some(err) = broken {
        return Err(err);
    }
    write_message(&mut out, &WorkerMessage::Done(report.termination.clone()))?;
    Ok(report.termination)
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use tpcc_core::TransactionKind;

    use super::*;

    #[test]
    fn test_message_lines() {
        let now = Local::now();
        let record = TransactionRecord::new(TransactionKind::Payment, now, now, true);
        let line = serde_json::to_string(&WorkerMessage::Record(record.clone())).unwrap();
        assert!(line.starts_with("{\"record\":"), "{line}");
        assert_eq!(
            serde_json::from_str::<WorkerMessage>(&line).unwrap(),
            WorkerMessage::Record(record)
        );

        let line = serde_json::to_string(&WorkerMessage::Done(Termination::Cancelled)).unwrap();
        assert_eq!(line, "{\"done\":\"Cancelled\"}");
    }

    #[test]
    fn test_unreachable_target_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let spec = WorkerSpec {
            worker: 4,
            phase: Phase::ReadWrite,
            transactions: 10,
            config: BenchConfig::builder()
                .client(
                    tpcc_drivers::ClientConfig::builder()
                        .port(port)
                        .ledger_dir(dir.path().join("logs"))
                        .build(),
                )
                .build(),
        };
        let mut out = Vec::new();
        let cancel = AtomicBool::new(false);
        let termination = serve_worker(&spec, &cancel, &mut out).unwrap();
        assert!(matches!(termination, Termination::Fatal(ref reason) if reason.contains("rw-4")));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("{\"done\":{\"Fatal\""), "{text}");
    }
}
