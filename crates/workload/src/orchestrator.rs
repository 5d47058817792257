//! Barrier coordination of the two workload phases.
//!
//! The orchestrator launches all workers of a phase, waits for every one of
//! them, then moves on: pre-check, read-write phase, read-only phase,
//! aggregation, post-checks. Workers are launched through a [`Launch`]
//! implementation, either on dedicated threads or as child processes.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use tpcc_core::stats::{merge, tpmc};
use tpcc_core::{ServerState, Summary};
use tpcc_drivers::{open_client, DbClient};

use crate::checker::{CheckReport, Checker};
use crate::engine::Termination;
use crate::mix::Phase;
use crate::report::{BenchReport, PhaseReport};
use crate::worker::{run_worker, WorkerMessage, WorkerReport, WorkerSpec};
use crate::{BenchConfig, Error};

/// Split a phase total across `workers`, the remainder going to the lowest
/// worker ids.
#[must_use]
pub fn split_transactions(total: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let count = workers as u64;
    let (share, remainder) = (total / count, total % count);
    (0..count)
        .map(|worker| share + u64::from(worker < remainder))
        .collect()
}

/// Runs every spec of a phase concurrently and blocks until all of the
/// workers have stopped.
pub trait Launch {
    /// Reports come back ordered by worker id.
    ///
    /// # Errors
    ///
    /// Fails only if the workers could not be started at all.
    fn launch(&self, specs: Vec<WorkerSpec>) -> Result<Vec<WorkerReport>, Error>;
}

/// One dedicated pool thread per worker inside the current process.
pub struct ThreadLauncher {
    cancel: Arc<AtomicBool>,
}

impl ThreadLauncher {
    #[must_use]
    pub const fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }
}

impl Launch for ThreadLauncher {
    fn launch(&self, specs: Vec<WorkerSpec>) -> Result<Vec<WorkerReport>, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(specs.len().max(1))
            .thread_name(|index| format!("tpcc-worker-{index}"))
            .build()?;
        let (sender, receiver) = mpsc::channel();
        let cancel: &AtomicBool = &self.cancel;
        pool.scope(|scope| {
            for spec in &specs {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let report = run_worker(spec, cancel, |_| {});
                    if sender.send(report).is_err() {
                        tracing::error!(worker = spec.worker, "report channel closed");
                    }
                });
            }
        });
        drop(sender);

        let mut reports: Vec<WorkerReport> = receiver.into_iter().collect();
        reports.sort_by_key(|report| report.worker);
        Ok(reports)
    }
}

/// One child process per worker, re-executing `program` with the hidden
/// `worker --spec <json>` subcommand.
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Launcher re-executing the running binary.
    ///
    /// # Errors
    ///
    /// Fails if the path of the running binary is unknown.
    pub fn current() -> Result<Self, Error> {
        Ok(Self::new(std::env::current_exe()?))
    }

    fn spawn(&self, spec: &WorkerSpec) -> Result<Child, Error> {
        let json = serde_json::to_string(spec)?;
        Command::new(&self.program)
            .arg("worker")
            .arg("--spec")
            .arg(json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Spawn {
                worker: spec.worker,
                source,
            })
    }
}

/// Termination of a child that exited without sending one.
fn termination_from_exit(spec: &WorkerSpec, code: Option<i32>) -> Termination {
    if code == Some(Termination::Cancelled.exit_code()) {
        return Termination::Cancelled;
    }
    let reason = match code {
        Some(code) => format!("exited with status {code} before reporting"),
        None => "killed by a signal".to_owned(),
    };
    Termination::Fatal(
        Error::WorkerProtocol {
            worker: spec.worker,
            reason,
        }
        .to_string(),
    )
}

fn collect_child(spec: &WorkerSpec, mut child: Child) -> WorkerReport {
    let mut records = Vec::new();
    let mut done = None;
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::error!(worker = spec.worker, %err, "worker stream unreadable");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(WorkerMessage::Record(record)) => records.push(record),
                Ok(WorkerMessage::Done(termination)) => done = Some(termination),
                Err(err) => {
                    tracing::warn!(worker = spec.worker, %err, %line, "ignoring malformed worker line");
                }
            }
        }
    }
    let termination = match (done, child.wait()) {
        (Some(termination), _) => termination,
        (None, Ok(status)) => termination_from_exit(spec, status.code()),
        (None, Err(err)) => Termination::Fatal(err.to_string()),
    };
    WorkerReport {
        worker: spec.worker,
        phase: spec.phase,
        termination,
        records,
    }
}

impl Launch for ProcessLauncher {
    fn launch(&self, specs: Vec<WorkerSpec>) -> Result<Vec<WorkerReport>, Error> {
        let mut children = Vec::with_capacity(specs.len());
        for spec in &specs {
            match self.spawn(spec) {
                Ok(child) => children.push((spec, child)),
                Err(err) => {
                    for (_, mut child) in children {
                        if let Err(kill) = child.kill().and_then(|()| child.wait().map(drop)) {
                            tracing::warn!(%kill, "could not stop worker");
                        }
                    }
                    return Err(err);
                }
            }
        }
        tracing::debug!(workers = children.len(), "worker processes started");

        let reports: Vec<WorkerReport> = thread::scope(|scope| {
            let readers: Vec<_> = children
                .into_iter()
                .map(|(spec, child)| (spec, scope.spawn(move || collect_child(spec, child))))
                .collect();
            readers
                .into_iter()
                .map(|(spec, reader)| {
                    reader.join().unwrap_or_else(|_| {
                        WorkerReport::failed(spec, "worker reader panicked".to_owned())
                    })
                })
                .collect()
        });
        Ok(reports)
    }
}

/// Drives one complete benchmark run.
pub struct Orchestrator<L> {
    config: BenchConfig,
    workers: usize,
    launcher: L,
    cancel: Arc<AtomicBool>,
}

impl<L: Launch> Orchestrator<L> {
    pub const fn new(
        config: BenchConfig,
        workers: usize,
        launcher: L,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            workers,
            launcher,
            cancel,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    fn checker_client(&self, label: &str) -> Result<Box<dyn DbClient + Send>, Error> {
        let mut client = open_client(&self.config.client, label)?;
        if client.connect() != ServerState::Ok {
            return Err(Error::Down {
                label: label.to_owned(),
            });
        }
        Ok(client)
    }

    fn phase(&self, phase: Phase, total: u64) -> Result<PhaseReport, Error> {
        if total == 0 {
            return Ok(PhaseReport::skipped(phase));
        }
        let specs = split_transactions(total, self.workers)
            .into_iter()
            .enumerate()
            .map(|(worker, transactions)| WorkerSpec {
                worker,
                phase,
                transactions,
                config: self.config.clone(),
            })
            .collect();

        tracing::info!(%phase, total, workers = self.workers, "phase started");
        let start = Instant::now();
        let reports = self.launcher.launch(specs)?;
        let elapsed = start.elapsed();

        for report in &reports {
            match &report.termination {
                Termination::Completed => {}
                Termination::Cancelled => {
                    tracing::warn!(worker = report.worker, %phase, "worker cancelled");
                }
                Termination::Fatal(reason) => {
                    tracing::error!(worker = report.worker, %phase, reason, "worker failed");
                }
            }
        }
        tracing::info!(%phase, elapsed = ?elapsed, "phase finished");
        Ok(PhaseReport::new(phase, elapsed, reports))
    }

    /// Run both phases with `rw` and `ro` scheduled transactions in total,
    /// bracketed by the consistency checks when validation is on.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, when workers cannot be launched, or
    /// when the checker cannot connect. Worker failures do not fail the
    /// run; they are part of the report.
    pub fn run(&self, rw: u64, ro: u64) -> Result<BenchReport, Error> {
        self.config.ensure_valid()?;
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "at least one worker is required".to_owned(),
            });
        }
        if rw + ro > 0 && !self.config.client.kind.executes_statements() {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "client {:?} cannot answer queries and cannot drive a workload",
                    self.config.client.kind
                ),
            });
        }

        let pre_check = if self.config.validate {
            let mut client = self.checker_client("pre-check")?;
            let report = Checker::new(&mut client, self.config.scale).consistency_check();
            client.close();
            Some(report)
        } else {
            None
        };
        let baseline = pre_check
            .as_ref()
            .and_then(|report| report.orders)
            .unwrap_or_else(|| self.config.scale.orders());

        let read_write = self.phase(Phase::ReadWrite, rw)?;
        let read_only = if self.cancel.load(Ordering::Relaxed) {
            tracing::warn!("cancelled, read-only phase skipped");
            PhaseReport::skipped(Phase::ReadOnly)
        } else {
            self.phase(Phase::ReadOnly, ro)?
        };

        let rw_summary = Summary::from_records(&read_write.records());
        let throughput = tpmc(rw_summary.successful_new_orders(), read_write.elapsed);
        let records = merge([read_write.records(), read_only.records()]);
        let summary = Summary::from_records(&records);

        let mut checks: Vec<CheckReport> = pre_check.into_iter().collect();
        if self.config.validate {
            let mut client = self.checker_client("post-check")?;
            let mut checker = Checker::new(&mut client, self.config.scale);
            checks.push(checker.consistency_check());
            checks.push(checker.consistency_check2(baseline, summary.successful_new_orders()));
            client.close();
        }

        Ok(BenchReport {
            summary,
            tpmc: throughput,
            serialized: self.config.serialized(),
            phases: vec![read_write, read_only],
            checks,
            records,
        })
    }
}
