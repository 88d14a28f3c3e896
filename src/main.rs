use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use spdlog::prelude::*;

use reportgen::openai::CompletionClient;
use reportgen::pages::{self, NoticeBoard};
use reportgen::routes::{self, AppState};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 3000)]
    port: u16,

    #[arg(long, default_value = "data/observations.csv")]
    dataset: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // The service still starts without a key; /api/generate answers 500
    // until one is provisioned.
    let completion = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Some(Arc::new(CompletionClient::new(key))),
        _ => {
            warn!("OPENAI_API_KEY not set, report generation is unavailable");
            None
        }
    };

    let notices = NoticeBoard::new(Duration::from_secs(pages::AUTO_CLOSE_SECS));
    let state = AppState {
        completion,
        dataset_path: Arc::new(args.dataset),
        notices: notices.clone(),
    };

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/dataset", get(routes::get_dataset))
        .route("/api/generate", post(routes::generate))
        .route("/pages/upload-complete", get(pages::upload_complete))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    notices.teardown();
    info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
