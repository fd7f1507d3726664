use clap::{command, Arg};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use abi::config::{Config, LogConfig};

const DEFAULT_CONFIG: &str = "./abi/fixtures/config.yml";

#[tokio::main]
async fn main() {
    let matches = command!()
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value(DEFAULT_CONFIG)
                .help("path to the yaml config file"),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG);

    let config = match Config::load(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config {path}: {err}");
            std::process::exit(1);
        }
    };

    // dropping the guard would stop the file writer
    let _guard = init_tracing(&config.log);

    info!("starting server on {}", config.server.server_url());
    if let Err(err) = api::start(config).await {
        error!("server exited: {err}");
        std::process::exit(1);
    }
}

/// RUST_LOG wins over the configured level; with `log.dir` set, output goes to a
/// daily rolling file instead of stdout
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(true);

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "lingo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
        None => {
            builder.init();
            None
        }
    }
}
