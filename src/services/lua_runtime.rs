use color_mapper::ColorMapper;
use mlua::{Lua, Result as LuaResult, Table, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::lua_color_mapper::{self, LuaColorMapper};
use crate::assets::AssetLoader;
use crate::error::{ConfigError, ScriptError};
use crate::models::AppConfig;

/// Result from running a controller script
#[derive(Debug)]
pub struct ScriptResult {
    /// Whatever the script returned, as JSON (`null` if nothing)
    pub data: serde_json::Value,
}

/// Lua runtime for executing controller scripts
///
/// Every run gets a fresh Lua state, so mappers built by one script are
/// never visible to another.
pub struct LuaRuntime {
    asset_loader: Arc<AssetLoader>,
    config: Arc<AppConfig>,
}

impl LuaRuntime {
    pub fn new(asset_loader: Arc<AssetLoader>, config: Arc<AppConfig>) -> Self {
        Self {
            asset_loader,
            config,
        }
    }

    /// Run a controller script with the given parameters
    pub fn run_script(
        &self,
        script_path: &Path,
        params: &HashMap<String, serde_yaml::Value>,
    ) -> Result<ScriptResult, ScriptError> {
        let script_content = self
            .asset_loader
            .read_script_string(script_path)
            .map_err(|e| ScriptError::NotFound(e.to_string()))?;

        tracing::debug!(script = %script_path.display(), "Running controller script");

        let lua = Lua::new();
        self.setup_globals(&lua, params)?;

        let result: Value = lua
            .load(&script_content)
            .set_name(script_path.to_string_lossy())
            .eval()?;

        Ok(ScriptResult {
            data: lua_to_json(result)?,
        })
    }

    /// Set up Lua global functions and variables
    fn setup_globals(&self, lua: &Lua, params: &HashMap<String, serde_yaml::Value>) -> LuaResult<()> {
        let globals = lua.globals();

        // Add params table
        let params_table = lua.create_table()?;
        for (key, value) in params {
            params_table.set(key.as_str(), yaml_to_lua(lua, value)?)?;
        }
        globals.set("params", params_table)?;

        // ColorMapper.new(mapping) -> mapper
        lua_color_mapper::register(lua)?;

        // palette(name?) -> mapper built from a configured palette
        let config = self.config.clone();
        let palette = lua.create_function(move |lua, name: Option<String>| {
            let name = config
                .resolve_palette_name(name.as_deref())
                .map_err(mlua::Error::external)?;
            let palette = config.get_palette(name).map_err(mlua::Error::external)?;

            let entries = palette
                .entries()
                .into_iter()
                .map(|(key, value)| -> LuaResult<(String, Value)> {
                    Ok((key, yaml_to_lua(lua, &value)?))
                })
                .collect::<LuaResult<Vec<_>>>()?;

            let mapper = ColorMapper::new(entries).map_err(|source| {
                mlua::Error::external(ConfigError::InvalidPalette {
                    name: name.to_string(),
                    source,
                })
            })?;
            tracing::debug!(palette = %name, entries = mapper.len(), "Loaded palette for script");
            Ok(LuaColorMapper::new(mapper))
        })?;
        globals.set("palette", palette)?;

        // Logging functions
        let log_info = lua.create_function(|_, msg: String| {
            tracing::info!(script = true, "{}", msg);
            Ok(())
        })?;
        globals.set("log_info", log_info)?;

        let log_warn = lua.create_function(|_, msg: String| {
            tracing::warn!(script = true, "{}", msg);
            Ok(())
        })?;
        globals.set("log_warn", log_warn)?;

        let log_error = lua.create_function(|_, msg: String| {
            tracing::error!(script = true, "{}", msg);
            Ok(())
        })?;
        globals.set("log_error", log_error)?;

        Ok(())
    }
}

/// Convert YAML value to Lua value
pub(crate) fn yaml_to_lua(lua: &Lua, value: &serde_yaml::Value) -> LuaResult<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Nil),
        serde_yaml::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Number(f))
            } else {
                Ok(Value::Nil)
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(lua.create_string(s)?)),
        serde_yaml::Value::Sequence(arr) => {
            let table = lua.create_table()?;
            for (i, v) in arr.iter().enumerate() {
                table.set(i + 1, yaml_to_lua(lua, v)?)?;
            }
            Ok(Value::Table(table))
        }
        serde_yaml::Value::Mapping(map) => {
            let table = lua.create_table()?;
            for (k, v) in map {
                if let serde_yaml::Value::String(key) = k {
                    table.set(key.as_str(), yaml_to_lua(lua, v)?)?;
                }
            }
            Ok(Value::Table(table))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_lua(lua, &tagged.value),
    }
}

/// Convert Lua value to JSON
///
/// Fails on values that contain themselves, e.g. a mapper storing a table
/// that refers back to the mapper.
pub(crate) fn lua_to_json(value: Value) -> LuaResult<serde_json::Value> {
    to_json(value, &mut HashSet::new())
}

fn to_json(value: Value, visiting: &mut HashSet<usize>) -> LuaResult<serde_json::Value> {
    let ptr = value.to_pointer() as usize;
    let nested = matches!(value, Value::Table(_) | Value::UserData(_));
    if nested && !visiting.insert(ptr) {
        return Err(mlua::Error::runtime("cannot convert cyclic value to JSON"));
    }

    let json = match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
        Value::Integer(i) => Ok(serde_json::Value::Number(i.into())),
        Value::Number(n) => Ok(serde_json::json!(n)),
        Value::String(s) => Ok(serde_json::Value::String(s.to_str()?.to_string())),
        Value::Table(t) => table_to_json(t, visiting),
        Value::UserData(ud) => {
            // Mappers serialize as their entry list
            if ud.is::<LuaColorMapper>() {
                let mapper = ud.borrow::<LuaColorMapper>()?;
                let entries = mapper
                    .mapper()
                    .iter()
                    .map(|entry| -> LuaResult<serde_json::Value> {
                        Ok(serde_json::json!({
                            "color": entry.color.to_string(),
                            "value": to_json(entry.value.clone(), visiting)?,
                        }))
                    })
                    .collect::<LuaResult<Vec<_>>>()?;
                Ok(serde_json::Value::Array(entries))
            } else {
                Ok(serde_json::Value::Null)
            }
        }
        _ => Ok(serde_json::Value::Null),
    };

    // Shared (non-cyclic) references may appear again elsewhere
    if nested {
        visiting.remove(&ptr);
    }
    json
}

fn table_to_json(t: Table, visiting: &mut HashSet<usize>) -> LuaResult<serde_json::Value> {
    // Check if it's an array (sequential integer keys starting at 1)
    let len = t.raw_len();
    if len > 0 {
        let mut key_count = 0;
        for _ in t.clone().pairs::<Value, Value>() {
            key_count += 1;
        }
        if key_count == len {
            let mut arr = Vec::with_capacity(len);
            for i in 1..=len {
                arr.push(to_json(t.raw_get::<Value>(i)?, visiting)?);
            }
            return Ok(serde_json::Value::Array(arr));
        }
    }

    // It's an object
    let mut map = serde_json::Map::new();
    for pair in t.pairs::<String, Value>() {
        let (k, v) = pair?;
        map.insert(k, to_json(v, visiting)?);
    }
    Ok(serde_json::Value::Object(map))
}
