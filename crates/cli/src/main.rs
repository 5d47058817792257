use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tpcc_cli::{App, Command, RunArgs, WorkerArgs};
use tpcc_core::ServerState;
use tpcc_drivers::{open_client, DbClient};
use tpcc_workload::orchestrator::{Launch, Orchestrator, ProcessLauncher, ThreadLauncher};
use tpcc_workload::{loader, worker, BenchConfig, Isolation, WorkerSpec};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install the interrupt handler");
    }

    let app = App::parse();
    match &app.command {
        Some(Command::Worker(args)) => serve(args, &cancel),
        None => run(&app.run, cancel),
    }
}

fn serve(args: &WorkerArgs, cancel: &AtomicBool) {
    let spec: WorkerSpec = serde_json::from_str(&args.spec).unwrap_or_else(|e| {
        eprintln!("Invalid worker spec: {e}");
        process::exit(2);
    });
    match worker::serve_worker(&spec, cancel, io::stdout().lock()) {
        Ok(termination) => process::exit(termination.exit_code()),
        Err(e) => {
            tracing::error!(worker = spec.worker, error = %e, "worker stream broken");
            process::exit(2);
        }
    }
}

fn run(args: &RunArgs, cancel: Arc<AtomicBool>) {
    let config = args.config();
    config.ensure_valid().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if args.clean || args.prepare {
        prepare(args, &config);
    }

    if args.rw + args.ro == 0 {
        return;
    }

    let code = match config.isolation {
        Isolation::Thread => {
            let launcher = ThreadLauncher::new(Arc::clone(&cancel));
            bench(args, config, launcher, cancel)
        }
        Isolation::Process => {
            let launcher = ProcessLauncher::current().unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(1);
            });
            bench(args, config, launcher, cancel)
        }
    };
    process::exit(code);
}

fn bench<L: Launch>(
    args: &RunArgs,
    config: BenchConfig,
    launcher: L,
    cancel: Arc<AtomicBool>,
) -> i32 {
    let orchestrator = Orchestrator::new(config, args.thread, launcher, cancel);
    match orchestrator.run(args.rw, args.ro) {
        Ok(report) => {
            println!("{report}");
            if args.analyze {
                println!("{}", report.analysis());
            }
            i32::from(!report.healthy())
        }
        Err(e) => {
            eprintln!("Run failed: {e}");
            1
        }
    }
}

fn prepare(args: &RunArgs, config: &BenchConfig) {
    let mut client = open_client(&config.client, "loader").unwrap_or_else(|e| {
        eprintln!("Failed to open the loader client: {e}");
        process::exit(1);
    });
    if client.connect() != ServerState::Ok {
        eprintln!("Loader could not connect");
        process::exit(1);
    }

    let outcome = load(args, config, &mut client);
    client.close();
    if let Err(e) = outcome {
        eprintln!("Prepare failed: {e}");
        process::exit(1);
    }
}

fn load(
    args: &RunArgs,
    config: &BenchConfig,
    client: &mut Box<dyn DbClient + Send>,
) -> Result<(), tpcc_workload::Error> {
    if args.clean {
        loader::drop_all(client)?;
    }
    if !args.prepare {
        return Ok(());
    }

    loader::build(client)?;
    match &args.data_dir {
        Some(dir) => {
            let statements = loader::send_dir(client, dir)?;
            tracing::info!(statements, dir = %dir.display(), "data files loaded");
        }
        None => {
            loader::load_population(client, &config.scale, config.seed)?;
        }
    }

    if config.client.kind.executes_statements() && !loader::count_star(client, &config.scale)? {
        tracing::warn!("loaded row counts differ from the configured scale");
    }
    if args.create_index {
        loader::create_indexes(client)?;
    }
    Ok(())
}
