mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use common::{prepare, reference_config};
use tpcc_core::TransactionKind;
use tpcc_drivers::DbClient;
use tpcc_workload::orchestrator::{Orchestrator, ThreadLauncher};
use tpcc_workload::Termination;

#[test]
fn test_single_worker_run_passes_both_checks() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 42);
    prepare(&config).close();

    let cancel = Arc::new(AtomicBool::new(false));
    let orchestrator = Orchestrator::new(
        config.clone(),
        1,
        ThreadLauncher::new(Arc::clone(&cancel)),
        cancel,
    );
    let report = orchestrator.run(100, 0).unwrap();

    assert_eq!(report.records.len(), 100, "{report}");
    assert_eq!(report.summary.attempts(), 100);
    assert_eq!(report.phases[0].workers.len(), 1);
    assert_eq!(report.phases[0].workers[0].termination, Termination::Completed);
    assert!(report.phases[1].workers.is_empty());

    assert_eq!(report.checks.len(), 3, "{report}");
    for check in &report.checks {
        assert!(check.passed(), "{check}");
    }
    let loaded = config.scale.orders();
    let committed = report.summary.successful_new_orders();
    assert!(committed > 0);
    assert_eq!(report.checks[2].orders, Some(loaded + committed));
    assert!(report.healthy());
    assert!(report.tpmc > 0.0);

    // Only mandated NewOrder rollbacks can fail against a single worker.
    for (kind, stats) in report.summary.iter() {
        if kind != TransactionKind::NewOrder {
            assert_eq!(stats.failures(), 0, "{kind}");
        }
    }
}

#[test]
fn test_workers_share_the_load_and_read_only_phase_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 5);
    prepare(&config).close();

    let cancel = Arc::new(AtomicBool::new(false));
    let orchestrator = Orchestrator::new(
        config,
        3,
        ThreadLauncher::new(Arc::clone(&cancel)),
        cancel,
    );
    let report = orchestrator.run(30, 20).unwrap();

    let read_write = &report.phases[0];
    assert_eq!(read_write.workers.len(), 3);
    for worker in &read_write.workers {
        assert_eq!(worker.termination, Termination::Completed, "{report}");
    }

    let read_only = &report.phases[1];
    assert_eq!(read_only.workers.len(), 3);
    let read_only_records = read_only.records();
    assert_eq!(read_only_records.len(), 20);
    assert!(read_only_records.iter().all(|record| record.kind.is_read_only()));

    assert!(report.checks.iter().all(|check| check.passed()), "{report}");
}

#[test]
fn test_cancelled_run_skips_read_only_phase() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 11);
    prepare(&config).close();

    let cancel = Arc::new(AtomicBool::new(true));
    let orchestrator = Orchestrator::new(
        config,
        2,
        ThreadLauncher::new(Arc::clone(&cancel)),
        cancel,
    );
    let report = orchestrator.run(10, 10).unwrap();

    assert!(report.records.is_empty());
    assert!(report.phases[0]
        .workers
        .iter()
        .all(|worker| worker.termination == Termination::Cancelled));
    assert!(report.phases[1].workers.is_empty());
    assert!(!report.healthy());
}
