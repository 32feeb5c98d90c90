use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for console output
    pub console_level: Level,
    /// Log level for file output
    pub file_level: Level,
    /// Directory where log files should be written
    pub log_dir: Option<PathBuf>,
    /// Whether to enable JSON formatted logs for structured output
    pub json_format: bool,
    /// Mirror logs to stderr
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: Level::INFO,
            file_level: Level::DEBUG,
            log_dir: Some(Self::default_log_dir()),
            json_format: false,
            console: false,
        }
    }
}

impl LoggingConfig {
    /// Get the OS-appropriate default log directory
    pub fn default_log_dir() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "gistr") {
            // On Linux: ~/.cache/gistr
            // On macOS: ~/Library/Caches/gistr
            proj_dirs.cache_dir().to_path_buf()
        } else {
            PathBuf::from("gistr-logs")
        }
    }

    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("GISTR_LOG_LEVEL") {
            if let Ok(parsed_level) = level.parse::<Level>() {
                config.console_level = parsed_level;
                config.file_level = parsed_level;
            }
        }

        if let Ok(log_dir) = std::env::var("GISTR_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(log_dir));
        }

        if std::env::var("GISTR_NO_FILE_LOGS").is_ok() {
            config.log_dir = None;
        }

        if std::env::var("GISTR_JSON_LOGS").is_ok() {
            config.json_format = true;
        }

        if std::env::var("GISTR_CONSOLE_LOGS").is_ok() {
            config.console = true;
        }

        config
    }

    /// Apply the `log_level` setting from the config file; "Off" disables file logs
    pub fn with_level_override(mut self, log_level: Option<&str>) -> Self {
        if let Some(log_level) = log_level {
            if log_level.eq_ignore_ascii_case("off") {
                self.log_dir = None;
                self.console = false;
            } else if let Ok(level) = log_level.parse::<Level>() {
                self.console_level = level;
                self.file_level = level;
            }
        }
        self
    }
}

/// Initialize the logging system with the given configuration
///
/// The returned guard must be kept alive for buffered file output to be flushed.
pub fn init_logging(
    config: LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let mut layers = vec![];
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "gistr.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(config.file_level.into())
                        .from_env_lossy(),
                )
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(config.file_level.into())
                        .from_env_lossy(),
                )
                .boxed()
        };

        layers.push(file_layer);
    }

    if config.console {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(
                EnvFilter::builder()
                    .with_default_directive(config.console_level.into())
                    .from_env_lossy(),
            )
            .boxed();

        layers.push(console_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_override() {
        let config = LoggingConfig::default().with_level_override(Some("warn"));
        assert_eq!(config.file_level, Level::WARN);
        assert_eq!(config.console_level, Level::WARN);
        assert!(config.log_dir.is_some());
    }

    #[test]
    fn test_off_disables_output() {
        let config = LoggingConfig {
            console: true,
            ..LoggingConfig::default()
        }
        .with_level_override(Some("Off"));

        assert!(config.log_dir.is_none());
        assert!(!config.console);
    }

    #[test]
    fn test_unparseable_level_is_ignored() {
        let config = LoggingConfig::default().with_level_override(Some("chatty"));
        assert_eq!(config.file_level, Level::DEBUG);
    }
}
