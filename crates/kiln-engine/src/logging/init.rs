use std::sync::Once;

use log::LevelFilter;

/// Logger setup for binaries.
///
/// `filter` uses `env_logger` directive syntax, e.g.
/// `"kiln_engine=debug,wgpu_core=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Overrides `RUST_LOG` when set.
    pub filter: Option<String>,
    /// Level used when neither `filter` nor `RUST_LOG` is set.
    pub default_level: LevelFilter,
    /// Caps wgpu and naga at `warn` under the default level.
    pub quiet_gpu: bool,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.default_level = level;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            quiet_gpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

const GPU_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Only the first call has an
/// effect; a logger installed by someone else is left alone.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        let directives = config.filter.or_else(|| std::env::var("RUST_LOG").ok());

        match directives {
            Some(directives) => {
                builder.parse_filters(&directives);
            }
            None => {
                builder.filter_level(config.default_level);
                if config.quiet_gpu {
                    let cap = config.default_level.min(LevelFilter::Warn);
                    for module in GPU_MODULES {
                        builder.filter_module(module, cap);
                    }
                }
            }
        }
        builder.write_style(config.write_style);

        match builder.try_init() {
            Ok(()) => log::debug!("env_logger installed"),
            Err(_) => log::debug!("global logger already set, keeping it"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default().with_level(LevelFilter::Debug));
        init_logging(LoggingConfig::default().with_filter("trace"));
        log::info!("still logging");
    }
}
