//! Process-wide engine boot.
//!
//! The engine must be initialized exactly once before any report is loaded or
//! rendered. Report loaders call [`ensure_initialized`] before first use; hosts
//! that want a specific configuration call [`initialize_with`] earlier.

use crate::config::EngineConfig;
use log::{info, warn};
use once_cell::sync::OnceCell;

/// Environment variable naming a JSON engine configuration file.
pub const CONFIG_ENV_VAR: &str = "REPORTFLOW_CONFIG";

static ENGINE: OnceCell<EngineConfig> = OnceCell::new();

/// Boots the engine if needed and returns its configuration. Idempotent.
pub fn ensure_initialized() -> &'static EngineConfig {
    ENGINE.get_or_init(|| {
        let config = load_from_environment();
        info!(
            "Reporting engine booted with {} configuration properties.",
            config.properties.len()
        );
        config
    })
}

/// Boots the engine with `config`.
///
/// Returns `false` and leaves the running configuration untouched when the
/// engine was already booted.
pub fn initialize_with(config: EngineConfig) -> bool {
    let installed = ENGINE.set(config).is_ok();
    if !installed {
        warn!("Reporting engine already booted; ignoring the supplied configuration.");
    }
    installed
}

pub fn is_initialized() -> bool {
    ENGINE.get().is_some()
}

/// The engine configuration, booting with defaults on first access.
pub fn global_config() -> &'static EngineConfig {
    ensure_initialized()
}

fn load_from_environment() -> EngineConfig {
    let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
        return EngineConfig::default();
    };
    match EngineConfig::from_file(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Could not read engine configuration from '{}': {}. Using defaults.", path, e);
            EngineConfig::default()
        }
    }
}
