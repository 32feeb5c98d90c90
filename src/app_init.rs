use std::sync::Arc;

use compact_str::format_compact;
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{ClientConfig, GistClient},
    config::GistrConfig,
    logging::{init_logging, LoggingConfig},
    result::{GistrError, Result},
};

pub struct AppComponents {
    pub client: Arc<GistClient>,
    pub _log_guard: Option<WorkerGuard>,
}

/// Must run inside the Tokio runtime the client will spawn onto.
pub async fn initialize_app(config: GistrConfig, debug: bool) -> Result<AppComponents> {
    color_eyre::install()
        .map_err(|e| GistrError::GeneralError(format_compact!("Failed to install color_eyre: {e}")))?;

    let log_guard = initialize_logging(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gistr starting up");

    let client = create_gist_client(config, debug)?;

    Ok(AppComponents { client, _log_guard: log_guard })
}

fn initialize_logging(gistr_config: &GistrConfig) -> Result<Option<WorkerGuard>> {
    let logging_config =
        LoggingConfig::from_env().with_level_override(gistr_config.log_level.as_deref());

    init_logging(logging_config).map_err(|e| {
        GistrError::GeneralError(format_compact!("Failed to initialize logging: {e}"))
    })
}

fn create_gist_client(config: GistrConfig, debug: bool) -> Result<Arc<GistClient>> {
    let client_config = ClientConfig::from(config).with_debug_logging(debug);
    let client = GistClient::new(client_config)?;

    Ok(Arc::new(client))
}
