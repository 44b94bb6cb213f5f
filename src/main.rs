use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::StartupError;

fn main() -> ExitCode {
    match run(std::env::var(config::PORT_ENV).ok()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// `port` is the raw `PORT` value
fn run(port: Option<String>) -> Result<(), StartupError> {
    let cfg = config::Config::load_with_port(port)?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Tokio runtime, worker count from config when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg, Arc::new(Notify::new())))
}

async fn async_main(cfg: config::Config, shutdown: Arc<Notify>) -> Result<(), StartupError> {
    let addr = cfg
        .get_socket_addr()
        .map_err(|source| StartupError::InvalidAddress {
            host: cfg.server.host.clone(),
            source,
        })?;

    // Fail fast: no retry when the port is taken or not permitted
    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
    let bound = listener.local_addr().unwrap_or(addr);

    let state = Arc::new(config::AppState::new(&cfg));
    server::start_signal_handler(Arc::clone(&shutdown)).map_err(StartupError::Signal)?;

    logger::log_server_start(&bound, &cfg);
    server::start_server_loop(listener, bound, state, shutdown).await;
    Ok(())
}
