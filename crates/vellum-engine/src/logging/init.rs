use std::sync::Once;

use env_logger::WriteStyle;
use log::LevelFilter;

/// Filter applied when neither the config nor `RUST_LOG` names one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// How the global logger is built.
///
/// `env_filter` uses `env_logger` directive syntax, e.g.
/// `"vellum_engine=debug,wgpu_core=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Config with an explicit filter.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Filter directives the logger will use: the configured filter, then
    /// `RUST_LOG`, then `None` for [`DEFAULT_LEVEL`].
    fn resolve_filter(&self) -> Option<String> {
        let non_blank = |f: &String| !f.trim().is_empty();
        self.env_filter
            .clone()
            .filter(non_blank)
            .or_else(|| std::env::var("RUST_LOG").ok().filter(non_blank))
    }
}

static INIT: Once = Once::new();

/// Installs the global `env_logger` on first call; later calls do nothing.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.resolve_filter() {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(DEFAULT_LEVEL);
            }
        }
        builder.write_style(config.write_style);

        // A test harness may already own the logger.
        if builder.try_init().is_err() {
            return;
        }
        log::debug!("logging initialized");
    });
}
