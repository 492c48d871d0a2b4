//=========================================================================
// Logging
//=========================================================================
//
// Process-wide `env_logger` setup for the binary.
//
// Library code only emits through `log` macros with a `target:` per
// subsystem (`shell`, `surface`, `router`, `frame_loop`, `platform`,
// `platform::input`, `driver`), so filters like
// `RUST_LOG=info,frame_loop=trace` work out of the box.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use log::LevelFilter;

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax and takes priority
/// over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub default_level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: LevelFilter::Info,
        }
    }
}

//=== init_logging ========================================================

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(config.default_level);
                }
            },
        }

        builder.write_style(config.write_style);

        // A logger installed by someone else wins.
        if builder.try_init().is_ok() {
            log::debug!(target: "shell", "Logging initialized");
        }
    });
}

//=========================================================================
// Unit Tests
//=========================================================================
