use crate::assets::AssetLoader;
use crate::error::ConfigError;
use color_mapper::ColorMapper;
use serde::Deserialize;
use std::collections::HashMap;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Named LED palettes
    #[serde(default)]
    pub palettes: HashMap<String, PaletteConfig>,

    /// Palette used when none is named explicitly
    #[serde(default)]
    pub default_palette: Option<String>,
}

/// Configuration for one LED palette
#[derive(Debug, Deserialize, Clone)]
pub struct PaletteConfig {
    /// Free-form description shown by `ledmap palettes`
    #[serde(default)]
    pub description: Option<String>,

    /// `"#RRGGBB"` keys to opaque values, in file order
    pub colors: serde_yaml::Mapping,
}

impl PaletteConfig {
    /// Entries as (key, value) pairs in file order.
    ///
    /// Non-string YAML keys are rendered to text so that mapper construction
    /// reports them as invalid color keys.
    pub fn entries(&self) -> Vec<(String, serde_yaml::Value)> {
        self.colors
            .iter()
            .map(|(k, v)| (key_to_string(k), v.clone()))
            .collect()
    }
}

fn key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(palettes = config.palettes.len(), "Loaded configuration");
                    config.warn_invalid_palettes();
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Log palettes that would fail to build, without rejecting the config
    fn warn_invalid_palettes(&self) {
        for name in self.palette_names() {
            if let Err(e) = self.build_mapper(name) {
                tracing::warn!(palette = %name, %e, "Invalid palette in config");
            }
        }
        if let Some(ref name) = self.default_palette {
            if !self.palettes.contains_key(name) {
                tracing::warn!(palette = %name, "default_palette is not defined");
            }
        }
    }

    /// Palette names, sorted
    pub fn palette_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.palettes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve an explicit palette name or fall back to `default_palette`
    pub fn resolve_palette_name<'a>(&'a self, name: Option<&'a str>) -> Result<&'a str, ConfigError> {
        name.or(self.default_palette.as_deref())
            .ok_or(ConfigError::NoDefaultPalette)
    }

    /// Get a palette config by name
    pub fn get_palette(&self, name: &str) -> Result<&PaletteConfig, ConfigError> {
        self.palettes
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPalette(name.to_string()))
    }

    /// Build a mapper for the named palette, with the YAML values as payload
    pub fn build_mapper(&self, name: &str) -> Result<ColorMapper<serde_yaml::Value>, ConfigError> {
        let palette = self.get_palette(name)?;
        ColorMapper::new(palette.entries()).map_err(|source| ConfigError::InvalidPalette {
            name: name.to_string(),
            source,
        })
    }
}
