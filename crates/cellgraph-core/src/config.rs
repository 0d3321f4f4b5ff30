//! Sheet configuration, loadable from TOML.
//!
//! ```toml
//! default_value = 0
//! formula_marker = "="
//! emit_events = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Numeric value an empty cell evaluates to.
    pub default_value: f64,
    /// Leading character that marks edit-line input as a formula.
    pub formula_marker: char,
    /// Whether the event hook (if any) is called.
    pub emit_events: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            default_value: 0.0,
            formula_marker: '=',
            emit_events: true,
        }
    }
}

impl SheetConfig {
    pub fn from_toml_str(text: &str) -> Result<SheetConfig> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<SheetConfig> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
