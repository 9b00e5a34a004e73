//! Configuration for the linked-selection engine
//!
//! Every recognized option is listed here with its default. Files may be
//! TOML or JSON; missing keys fall back to the defaults and the merged
//! result is validated once, when the engine is constructed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::colormap::{Color, Colormap};
use crate::error::{LinkError, LinkResult};

/// Engine-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Shared color encoding
    pub color: ColorConfig,
    /// External selection sync
    pub sync: SyncConfig,
}

/// Color encoding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Attribute to color by at startup
    pub attribute: Option<String>,
    /// Built-in colormap name
    pub colormap: String,
    /// Run the colormap backwards
    pub reversed: bool,
    /// Hex color for values that cannot be mapped
    pub no_data: String,
    /// Derive the scale from the selected records only
    pub restrict_to_selection: bool,
    /// Number of swatches in a numeric legend
    pub legend_samples: usize,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            attribute: None,
            colormap: "viridis".to_string(),
            reversed: false,
            no_data: "#808080".to_string(),
            restrict_to_selection: false,
            legend_samples: 5,
        }
    }
}

impl ColorConfig {
    /// Resolve the configured colormap
    pub fn resolve_colormap(&self) -> LinkResult<Colormap> {
        let cmap = Colormap::named(&self.colormap).ok_or_else(|| LinkError::UnknownColormap {
            name: self.colormap.clone(),
        })?;
        Ok(if self.reversed { cmap.reversed() } else { cmap })
    }

    /// Resolve the no-data color
    pub fn resolve_no_data(&self) -> LinkResult<Color> {
        Color::from_hex(&self.no_data).ok_or_else(|| {
            LinkError::InvalidConfig(format!("no_data is not a #RRGGBB color: {}", self.no_data))
        })
    }
}

/// External sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Publish selections to an external consumer
    pub enabled: bool,
    /// Payloads buffered before the oldest are dropped
    pub max_pending: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_pending: 64,
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> LinkResult<Self> {
        toml::from_str(toml_str).map_err(|e| LinkError::ConfigParse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> LinkResult<String> {
        toml::to_string_pretty(self).map_err(|e| LinkError::ConfigParse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> LinkResult<Self> {
        serde_json::from_str(json_str).map_err(|e| LinkError::ConfigParse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> LinkResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LinkError::ConfigParse(e.to_string()))
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> LinkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> LinkResult<()> {
        self.color.resolve_colormap()?;
        self.color.resolve_no_data()?;

        if self.color.legend_samples < 2 {
            return Err(LinkError::InvalidConfig(
                "legend_samples must be at least 2".to_string(),
            ));
        }

        if self.sync.max_pending == 0 {
            return Err(LinkError::InvalidConfig(
                "sync.max_pending must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
