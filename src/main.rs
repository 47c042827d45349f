#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use crate::application::cli;
use crate::application::server;
use crate::application::server::AppState;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::Persona;
use crate::domain::services::ConversationService;
use crate::domain::services::SessionStore;
use crate::infrastructure::backends::Ollama;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Chatrelay has failed with the following app version and error.\n\nVersion: {}\nBuilt: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_BUILD_TIMESTAMP"),
            err
        ))
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

fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| return EnvFilter::new("info"));

    let log_dir = Config::get(ConfigKey::LogDir);
    if log_dir.is_empty() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
        return None;
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "chatrelay.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    return Some(guard);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn serve() -> Result<()> {
    tracing::debug!(
        host = %Config::get(ConfigKey::Host),
        port = %Config::get(ConfigKey::Port),
        model = %Config::get(ConfigKey::Model),
        ollama_url = %Config::get(ConfigKey::OllamaURL),
        fallback_url = %Config::get(ConfigKey::FallbackURL),
        max_retries = %Config::get(ConfigKey::MaxRetries),
        "Config loaded"
    );

    let persona = Persona::load(
        &Config::get(ConfigKey::PersonaFile),
        &Config::get(ConfigKey::AssistantName),
    )
    .await?;

    let backend = Ollama::from_config()?;
    if let Err(err) = backend.health_check().await {
        tracing::warn!(
            error = ?err,
            url = backend.url(),
            "Backend health check failed, serving anyway"
        );
    }

    let backend_url = backend.url().to_string();
    let store = Arc::new(SessionStore::new());
    let conversation = ConversationService::new(store.clone(), Arc::new(backend), persona);

    let app = server::router(AppState {
        conversation: Arc::new(conversation),
        model: Config::get(ConfigKey::Model),
        backend_url,
    });

    let addr = SocketAddr::new(
        Config::get(ConfigKey::Host).parse()?,
        Config::get_parsed::<u16>(ConfigKey::Port)?,
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, model = Config::get(ConfigKey::Model), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let dropped = store.drain();
    tracing::info!(sessions = dropped, "Server stopped, sessions dropped");

    return Ok(());
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let ready_res = cli::parse().await;
    match ready_res {
        Ok(true) => {}
        Ok(false) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    }

    let _guard = init_logging();

    if let Err(err) = serve().await {
        handle_error(err);
    }
}
