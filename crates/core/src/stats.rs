//! Merging of per-worker transaction records into global statistics.

use core::fmt::{Display, Formatter};
use core::time::Duration;

use crate::record::{TransactionKind, TransactionRecord};

/// Counters for a single transaction kind.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    pub attempts: u64,
    pub successes: u64,
    pub total_latency: Duration,
    pub min_latency: Option<Duration>,
    pub max_latency: Option<Duration>,
}

impl KindStats {
    fn add(&mut self, record: &TransactionRecord) {
        let latency = record.latency().to_std().unwrap_or_default();
        self.attempts += 1;
        if record.succeeded {
            self.successes += 1;
        }
        self.total_latency += latency;
        self.min_latency = Some(self.min_latency.map_or(latency, |min| min.min(latency)));
        self.max_latency = Some(self.max_latency.map_or(latency, |max| max.max(latency)));
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.attempts - self.successes
    }

    #[must_use]
    pub fn avg_latency(&self) -> Duration {
        if self.attempts == 0 {
            return Duration::ZERO;
        }
        self.total_latency / u32::try_from(self.attempts).unwrap_or(u32::MAX)
    }

    /// Percentage of attempts that failed.
    #[must_use]
    pub fn rollback_rate(&self) -> f64 {
        rate(self.failures(), self.attempts)
    }
}

fn rate(failures: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        failures as f64 / attempts as f64 * 100.0
    }
}

/// Global statistics over all merged records.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    per_kind: [KindStats; 5],
}

impl Summary {
    #[must_use]
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.per_kind[record.kind.index()].add(record);
        }
        tracing::debug!(records = records.len(), "summarized transaction records");
        summary
    }

    #[must_use]
    pub const fn kind(&self, kind: TransactionKind) -> &KindStats {
        &self.per_kind[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransactionKind, &KindStats)> {
        TransactionKind::ALL
            .into_iter()
            .map(|kind| (kind, &self.per_kind[kind.index()]))
    }

    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.per_kind.iter().map(|stats| stats.attempts).sum()
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.per_kind.iter().map(KindStats::failures).sum()
    }

    #[must_use]
    pub fn overall_rollback_rate(&self) -> f64 {
        rate(self.failures(), self.attempts())
    }

    #[must_use]
    pub const fn successful_new_orders(&self) -> u64 {
        self.kind(TransactionKind::NewOrder).successes
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "{:<12} {:>8} {:>8} {:>8} {:>12} {:>10}",
            "type", "total", "success", "fail", "avg(ms)", "rollback"
        )?;
        for (kind, stats) in self.iter() {
            writeln!(
                f,
                "{:<12} {:>8} {:>8} {:>8} {:>12.3} {:>9.2}%",
                kind.name(),
                stats.attempts,
                stats.successes,
                stats.failures(),
                stats.avg_latency().as_secs_f64() * 1_000.0,
                stats.rollback_rate(),
            )?;
        }
        write!(f, "Total Rollback Rate: {:.2}%", self.overall_rollback_rate())
    }
}

/// Concatenate the record sequences of all workers, preserving each
/// worker's order.
#[must_use]
pub fn merge<I>(per_worker: I) -> Vec<TransactionRecord>
where
    I: IntoIterator<Item = Vec<TransactionRecord>>,
{
    let mut merged = Vec::new();
    let mut workers = 0_usize;
    for records in per_worker {
        workers += 1;
        merged.extend(records);
    }
    tracing::info!(
        workers,
        transactions = merged.len(),
        "merged transaction records"
    );
    merged
}

/// Successful NewOrder transactions per minute of `elapsed`.
#[must_use]
pub fn tpmc(successful_new_orders: u64, elapsed: Duration) -> f64 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    successful_new_orders as f64 / minutes
}

/// Cumulative count of successful NewOrders against elapsed time since
/// `records` began, in completion order.
#[must_use]
pub fn new_order_timeline(records: &[TransactionRecord]) -> Vec<(Duration, u64)> {
    let mut ends: Vec<_> = records
        .iter()
        .filter(|record| record.kind == TransactionKind::NewOrder && record.succeeded)
        .map(|record| record.end)
        .collect();
    ends.sort_unstable();
    let Some(origin) = records.iter().map(|record| record.start).min() else {
        return Vec::new();
    };
    ends.into_iter()
        .zip(1..)
        .map(|(end, count)| ((end - origin).to_std().unwrap_or_default(), count))
        .collect()
}
