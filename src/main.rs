#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use infrastructure::remote::RemoteManager;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task;
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::Exchange;
use crate::domain::services::Pipeline;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        format!(
            "Oh no! MindBack has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        )
        .red()
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn log_dir() -> PathBuf {
    if let Ok(dir) = env::var("MINDBACK_LOG_DIR") {
        return PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(|| return PathBuf::from("."))
        .join("mindback");
}

/// Debug logs are only written when `RUST_LOG` mentions the app, so the
/// terminal UI never has logs printed over it.
fn logging_enabled(rust_log: &str) -> bool {
    return rust_log.contains("mindback");
}

/// Starts the JSON file logger. The returned guard flushes buffered lines
/// when dropped.
fn init_logging(rust_log: &str, dir: PathBuf) -> Option<WorkerGuard> {
    if !logging_enabled(rust_log) {
        return None;
    }

    let file_appender = tracing_appender::rolling::never(dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(writer)
        .init();

    return Some(guard);
}

async fn run_services(
    tx: mpsc::UnboundedSender<Event>,
    rx: &mut mpsc::UnboundedReceiver<Action>,
) -> Result<()> {
    let remote = RemoteManager::get()?;
    let chat_timeout = Duration::from_millis(Config::get_u64(ConfigKey::ChatTimeout)?);
    let exchange = Exchange::new(remote.clone(), chat_timeout);
    let pipeline = Pipeline::new(remote);

    return ActionsService::start(exchange, pipeline, tx, rx).await;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let log_guard = init_logging(
        &env::var("RUST_LOG").unwrap_or_else(|_| return "".to_string()),
        log_dir(),
    );

    match cli::parse().await {
        Ok(true) => {}
        Ok(false) => {
            drop(log_guard);
            process::exit(0);
        }
        Err(err) => {
            drop(log_guard);
            handle_error(err);
            return;
        }
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return run_services(event_tx, &mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(anyhow!(err)),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if let Err(err) = res {
        tracing::error!(error = ?err, "Exiting with error");
        drop(log_guard);
        ui::destruct_terminal_for_panic();
        handle_error(err);
        return;
    }

    drop(log_guard);
    process::exit(0);
}
