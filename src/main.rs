#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::str::FromStr;

use anyhow::Error;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Session;
use crate::domain::models::Theme;
use crate::domain::services::Preferences;
use crate::domain::services::SessionController;
use crate::infrastructure::transport::TransportManager;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        format!(
            "Oh no! FlipAssist has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
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

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    if !env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("flipassist")
    {
        return None;
    }

    let debug_log_dir = env::var("FLIPASSIST_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("flipassist")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(writer)
        .init();

    return Some(guard);
}

/// Config wins, then the theme last picked in the UI.
async fn resolve_theme() -> Theme {
    let configured = Config::get(ConfigKey::Theme);
    if !configured.is_empty() {
        if let Ok(theme) = Theme::from_str(&configured) {
            return theme;
        }
        tracing::warn!(theme = %configured, "Ignoring unknown theme");
    }

    return Preferences::default().load_theme().await;
}

async fn run() -> Result<()> {
    let session = Session::new();
    let session_id = session.id().clone();
    let transport = TransportManager::from_config()?;
    let theme = resolve_theme().await;
    tracing::info!(session_id = %session_id, theme = %theme, "Starting chat");

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        let controller = SessionController::new(session, transport, event_tx);
        return controller.start(&mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx, session_id, theme);

    return tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let guard = init_logging();

    match cli::parse().await {
        Ok(true) => {}
        Ok(false) => {
            drop(guard);
            process::exit(0);
        }
        Err(err) => {
            handle_error(err);
            return;
        }
    }

    if let Err(err) = run().await {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    drop(guard);
    process::exit(0);
}
