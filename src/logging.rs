use crate::settings::LoggingSettings;

/// Installs an `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more than once is
/// harmless; only the first backend is installed.
pub fn init_logging(settings: &LoggingSettings) {
    let env = env_logger::Env::default().default_filter_or(settings.level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
