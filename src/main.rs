mod app;
mod auth;
mod config;
mod courses;
mod error;
mod state;
mod store;
mod users;
mod validation;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

use crate::{
    config::{AppConfig, LogFormat},
    state::AppState,
};

const DEFAULT_LOG_FILTER: &str = "course_catalog=debug,axum=info,tower_http=info";

/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => subscriber.json().with_target(false).init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let config = AppConfig::from_env()?;
    let state = AppState::init(&config).await?;
    let app = app::build_app(state);

    app::serve(app, &config).await
}
