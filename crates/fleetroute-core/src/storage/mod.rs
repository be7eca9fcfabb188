mod config;
pub mod session_store;

pub use config::{ApiConfig, ClusterConfig, Config, GestureConfig, RouteConfig};
pub use session_store::SessionStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding config, session and outbox files.
///
/// `FLEETROUTE_DATA_DIR` wins when set. Otherwise `~/.config/fleetroute`,
/// or `~/.config/fleetroute-dev` when `FLEETROUTE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FLEETROUTE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FLEETROUTE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fleetroute-dev")
            } else {
                base_dir.join("fleetroute")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
