use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use static_gateway::config::{self, cli::Cli, AppState};
use static_gateway::logger;
use static_gateway::server::{wait_for_termination, Phase, Server};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), BoxError> {
    // Usage errors, --help and --version exit here
    let cli = Cli::parse();
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;
    logger::log_phase(Phase::Initializing);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let state = Arc::new(AppState::from_config(cfg, cli.build_root.as_deref())?);
    let result = runtime.block_on(async_main(state));
    // In-flight connections are not drained
    runtime.shutdown_background();
    result
}

async fn async_main(state: Arc<AppState>) -> Result<(), BoxError> {
    let server = Server::bind(state)?;
    tokio::select! {
        () = server.run() => Ok(()),
        signal = wait_for_termination() => {
            logger::log_termination(signal?);
            Ok(())
        }
    }
}
