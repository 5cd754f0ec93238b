//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use config_loader::{BridgeBlueprint, ConfigLoader};
use tracing::info;

use crate::error::{CliError, Result};

/// Load the configuration file, or the built-in wiring when none is given
pub(crate) fn load_blueprint(config: Option<&Path>) -> Result<BridgeBlueprint> {
    match config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading configuration");
            Ok(ConfigLoader::load_from_path(path)?)
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            Ok(BridgeBlueprint::default())
        }
    }
}
