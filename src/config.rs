use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::language::LanguageMode;
use crate::learning::LearningConfig;
use crate::swipe::SwipeConfig;

const APP_NAME: &str = "bilingual-autocorrect";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enabled_by_default: bool,
    pub language_mode: LanguageMode,
    /// 1 keeps correction to single edits; 2 also searches edits of edits.
    pub max_edit_distance: usize,
    pub cache_capacity: usize,
    pub fuzzy_enabled: bool,
    pub fuzzy_scan_limit: usize,
    /// Undos of the same correction before it is never proposed again.
    pub rejection_threshold: u32,
    /// Where learned tables live; the platform data dir when unset.
    pub state_dir: Option<PathBuf>,
    pub learning: LearningConfig,
    pub swipe: SwipeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            language_mode: LanguageMode::Bilingual,
            max_edit_distance: 1,
            cache_capacity: 256,
            fuzzy_enabled: true,
            fuzzy_scan_limit: 3000,
            rejection_threshold: 2,
            state_dir: None,
            learning: LearningConfig::default(),
            swipe: SwipeConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, Some("config"), self)
    }
}
