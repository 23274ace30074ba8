use std::path::{Path, PathBuf};

use derivative::Derivative;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::view::{ViewOptions, DEFAULT_WELCOME_TEXT};

/// Settings for the CLI and the HTTP service.
///
/// Every field is optional in the JSON file; missing ones take their defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Derivative, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
#[derivative(Default)]
pub struct Config {
    #[derivative(Default(value = "PathBuf::from(\"game.pgn\")"))]
    pub pgn_path: PathBuf,
    #[derivative(Default(value = "\"127.0.0.1:5000\".to_string()"))]
    pub bind_address: String,
    /// Fewest empty alternative columns the table reserves.
    #[derivative(Default(value = "4"))]
    pub min_alternative_slots: usize,
    #[derivative(Default(value = "DEFAULT_WELCOME_TEXT.to_string()"))]
    pub welcome_text: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            min_alternative_slots: self.min_alternative_slots,
            welcome_text: self.welcome_text.clone(),
        }
    }
}
