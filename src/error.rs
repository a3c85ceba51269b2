use color_mapper::MapperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    #[error("No palette given and no default_palette configured")]
    NoDefaultPalette,

    #[error("Invalid palette '{name}': {source}")]
    InvalidPalette {
        name: String,
        #[source]
        source: MapperError,
    },
}

/// Error type for Lua script execution
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("Script not found: {0}")]
    NotFound(String),
}
