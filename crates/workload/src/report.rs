//! Final report of a run.

use core::fmt::{Display, Formatter};
use core::time::Duration;

use tpcc_core::stats::new_order_timeline;
use tpcc_core::{Summary, TransactionRecord};

use crate::checker::CheckReport;
use crate::engine::Termination;
use crate::mix::Phase;
use crate::worker::WorkerReport;

/// Outcome of one phase: its wall-clock span and every worker's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
}

impl PhaseReport {
    #[must_use]
    pub const fn new(phase: Phase, elapsed: Duration, workers: Vec<WorkerReport>) -> Self {
        Self {
            phase,
            elapsed,
            workers,
        }
    }

    /// A phase with nothing scheduled.
    #[must_use]
    pub const fn skipped(phase: Phase) -> Self {
        Self::new(phase, Duration::ZERO, Vec::new())
    }

    /// All records of the phase, worker by worker.
    #[must_use]
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.workers
            .iter()
            .flat_map(|worker| worker.records.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.workers
            .iter()
            .all(|worker| worker.termination == Termination::Completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub summary: Summary,
    /// Successful NewOrders per minute of the read-write phase.
    pub tpmc: f64,
    /// Every statement went through the global lock.
    pub serialized: bool,
    pub phases: Vec<PhaseReport>,
    pub checks: Vec<CheckReport>,
    /// Merged records of both phases.
    pub records: Vec<TransactionRecord>,
}

impl BenchReport {
    /// Every worker completed and every check passed.
    #[must_use]
    pub fn healthy(&self) -> bool {
        self.phases.iter().all(PhaseReport::all_completed)
            && self.checks.iter().all(CheckReport::passed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.phases.iter().map(|phase| phase.elapsed).sum()
    }

    /// Detailed statistics for `--analyze`.
    #[must_use]
    pub const fn analysis(&self) -> Analysis<'_> {
        Analysis { report: self }
    }
}

impl Display for BenchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.summary)?;
        for phase in &self.phases {
            writeln!(f, "{} elapsed: {:.3}s", phase.phase, phase.elapsed.as_secs_f64())?;
        }
        writeln!(f, "total elapsed: {:.3}s", self.elapsed().as_secs_f64())?;
        write!(f, "tpmC: {:.2}", self.tpmc)?;
        if self.serialized {
            f.write_str(" (serialized: global lock enabled)")?;
        }
        writeln!(f)?;

        writeln!(f, "workers:")?;
        for phase in &self.phases {
            for worker in &phase.workers {
                write!(f, "  {}-{}: ", phase.phase, worker.worker)?;
                match &worker.termination {
                    Termination::Completed => f.write_str("completed")?,
                    Termination::Cancelled => f.write_str("cancelled")?,
                    Termination::Fatal(reason) => write!(f, "fatal: {reason}")?,
                }
                writeln!(f, " ({} records)", worker.records.len())?;
            }
        }

        if self.checks.is_empty() {
            write!(f, "checks: skipped")
        } else {
            write!(f, "checks:")?;
            for check in &self.checks {
                write!(f, "\n  {check}")?;
            }
            Ok(())
        }
    }
}

/// Latency extremes and the NewOrder timeline of a report.
pub struct Analysis<'r> {
    report: &'r BenchReport,
}

impl Analysis<'_> {
    /// Cumulative successful NewOrders at the end of every elapsed second
    /// in which one committed.
    #[must_use]
    pub fn timeline(&self) -> Vec<(u64, u64)> {
        let mut per_second: Vec<(u64, u64)> = Vec::new();
        for (elapsed, count) in new_order_timeline(&self.report.records) {
            let second = elapsed.as_secs();
            match per_second.last_mut() {
                Some(last) if last.0 == second => last.1 = count,
                _ => per_second.push((second, count)),
            }
        }
        per_second
    }
}

fn millis(latency: Option<Duration>) -> f64 {
    latency.map_or(0.0, |latency| latency.as_secs_f64() * 1_000.0)
}

impl Display for Analysis<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:<12} {:>12} {:>12}", "type", "min(ms)", "max(ms)")?;
        for (kind, stats) in self.report.summary.iter() {
            writeln!(
                f,
                "{:<12} {:>12.3} {:>12.3}",
                kind.name(),
                millis(stats.min_latency),
                millis(stats.max_latency)
            )?;
        }
        write!(f, "new order timeline (second, committed):")?;
        for (second, count) in self.timeline() {
            write!(f, "\n  {second:>6} {count:>8}")?;
        }
        Ok(())
    }
}
