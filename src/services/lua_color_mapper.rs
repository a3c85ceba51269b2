//! `ColorMapper` as seen from Lua controller scripts.
//!
//! Scripts build a mapper from a table of `"#RRGGBB"` keys and query it with
//! whatever color representation they have at hand. All loose host input is
//! converted here; the engine only ever sees validated keys and colors.

use color_mapper::{Color, ColorMapper, MapperError};
use mlua::{Lua, MetaMethod, Result as LuaResult, Table, UserData, UserDataMethods, Value};

/// A color mapper owned by a Lua state, with arbitrary Lua values as payload
pub struct LuaColorMapper {
    mapper: ColorMapper<Value>,
}

impl LuaColorMapper {
    pub fn new(mapper: ColorMapper<Value>) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &ColorMapper<Value> {
        &self.mapper
    }

    /// Build a mapper from the argument of `ColorMapper.new`.
    ///
    /// Accepts either a table keyed by color strings, or a sequence of
    /// `{ color, value }` pairs. Keyed tables have no defined iteration
    /// order in Lua, so their entries are sorted by key to keep tie-breaks
    /// stable; pair sequences keep the order given.
    pub fn from_lua_mapping(mapping: Value) -> LuaResult<Self> {
        let table = match mapping {
            Value::Table(t) => t,
            Value::Nil => return Err(mapper_error(MapperError::EmptyMapping)),
            other => {
                tracing::debug!(arg = other.type_name(), "ColorMapper.new called without a table");
                return Err(mapper_error(MapperError::EmptyMapping));
            }
        };

        let entries = if is_pair_sequence(&table)? {
            pair_entries(&table)?
        } else {
            keyed_entries(&table)?
        };

        let mapper = ColorMapper::new(entries).map_err(mapper_error)?;
        tracing::debug!(entries = mapper.len(), "Constructed color mapper");
        Ok(Self::new(mapper))
    }
}

fn mapper_error(err: MapperError) -> mlua::Error {
    mlua::Error::external(err)
}

/// True if the table is a non-empty list whose first element is a table
fn is_pair_sequence(table: &Table) -> LuaResult<bool> {
    if table.raw_len() == 0 {
        return Ok(false);
    }
    Ok(matches!(table.raw_get::<Value>(1)?, Value::Table(_)))
}

fn pair_entries(table: &Table) -> LuaResult<Vec<(String, Value)>> {
    let len = table.raw_len();

    let mut index_count = 0;
    for pair in table.clone().pairs::<Value, Value>() {
        match pair?.0 {
            Value::Integer(i) if i >= 1 => index_count += 1,
            _ => {
                return Err(mlua::Error::runtime(
                    "ColorMapper.new: cannot mix { color, value } pairs with color keys",
                ))
            }
        }
    }
    if index_count != len {
        return Err(holes_error());
    }

    let mut entries = Vec::with_capacity(len);
    for i in 1..=len {
        let pair = match table.raw_get::<Value>(i)? {
            Value::Table(pair) => pair,
            Value::Nil => return Err(holes_error()),
            other => {
                return Err(mlua::Error::runtime(format!(
                    "ColorMapper.new: entry {i} must be a {{ color, value }} pair, got {}",
                    other.type_name()
                )))
            }
        };
        let key: Value = pair.raw_get(1)?;
        let value: Value = pair.raw_get(2)?;
        entries.push((key_to_string(&key), value));
    }
    Ok(entries)
}

fn holes_error() -> mlua::Error {
    mlua::Error::runtime("ColorMapper.new: { color, value } pairs must form a sequence without holes")
}

fn keyed_entries(table: &Table) -> LuaResult<Vec<(String, Value)>> {
    let mut entries = Vec::new();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, value) = pair?;
        entries.push((key_to_string(&key), value));
    }

    // Case-insensitive first so equal colors are adjacent; the raw key
    // breaks ties so duplicate colors resolve the same way on every run.
    entries.sort_by(|(a, _), (b, _)| {
        a.to_ascii_uppercase()
            .cmp(&b.to_ascii_uppercase())
            .then_with(|| a.cmp(b))
    });
    Ok(entries)
}

/// Render a table key as text; non-string keys can never be valid colors
/// and are reported by the mapper as invalid keys.
fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string_lossy(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => format!("<{}>", other.type_name()),
    }
}

/// Convert a Lua query value into a color.
///
/// Accepted forms: `0xRRGGBB` integers (bits above 24 ignored), integral
/// floats, `"#RRGGBB"` strings, and `{ red = r, green = g, blue = b }`.
pub fn color_from_lua(value: &Value) -> LuaResult<Color> {
    match value {
        Value::Integer(i) => packed_color(*i),
        Value::Number(n) if n.fract() == 0.0 => packed_color(*n as i64),
        Value::String(s) => {
            let text = s.to_str()?;
            text.parse::<Color>().map_err(|e| {
                mlua::Error::runtime(format!("invalid color \"{}\": {e}", &*text))
            })
        }
        Value::Table(t) => Ok(Color::new(
            channel(t, "red")?,
            channel(t, "green")?,
            channel(t, "blue")?,
        )),
        other => Err(mlua::Error::runtime(format!(
            "expected a color (0xRRGGBB, \"#RRGGBB\" or {{ red, green, blue }}), got {}",
            other.type_name()
        ))),
    }
}

fn packed_color(packed: i64) -> LuaResult<Color> {
    u32::try_from(packed)
        .map(Color::from_rgb24)
        .map_err(|_| mlua::Error::runtime(format!("color {packed} is out of range")))
}

fn channel(table: &Table, name: &str) -> LuaResult<u8> {
    let value: Value = table.get(name)?;
    let channel = match value {
        Value::Integer(i) => u8::try_from(i).ok(),
        Value::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(&n) => Some(n as u8),
        _ => None,
    };
    channel.ok_or_else(|| {
        mlua::Error::runtime(format!("color field '{name}' must be an integer in 0..=255"))
    })
}

/// Convert a color into the table scripts receive
pub fn color_to_lua(lua: &Lua, color: Color) -> LuaResult<Table> {
    let table = lua.create_table()?;
    table.set("red", color.red())?;
    table.set("green", color.green())?;
    table.set("blue", color.blue())?;
    table.set("rgb", color.to_rgb24())?;
    table.set("hex", color.to_string())?;
    Ok(table)
}

fn nearest_color(lua: &Lua, this: &LuaColorMapper, query: Value) -> LuaResult<Table> {
    let query = color_from_lua(&query)?;
    color_to_lua(lua, this.mapper.nearest_color(query))
}

fn value_for_nearest_color(_: &Lua, this: &LuaColorMapper, query: Value) -> LuaResult<Value> {
    let query = color_from_lua(&query)?;
    Ok(this.mapper.value_for_nearest_color(query).clone())
}

impl UserData for LuaColorMapper {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // nearest_color(color) -> { red, green, blue, rgb, hex }
        methods.add_method("nearest_color", nearest_color);

        // value_for_nearest_color(color) -> stored value
        methods.add_method("value_for_nearest_color", value_for_nearest_color);

        // Names used by existing controller mappings
        methods.add_method("getNearestColor", nearest_color);
        methods.add_method("getValueForNearestColor", value_for_nearest_color);

        methods.add_method("len", |_, this, ()| Ok(this.mapper.len()));
        methods.add_meta_method(MetaMethod::Len, |_, this, ()| Ok(this.mapper.len()));
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("ColorMapper({} entries)", this.mapper.len()))
        });
    }
}

/// Register the `ColorMapper` global with its `new` constructor
pub fn register(lua: &Lua) -> LuaResult<()> {
    let class = lua.create_table()?;
    let new = lua.create_function(|_, mapping: Value| LuaColorMapper::from_lua_mapping(mapping))?;
    class.set("new", new)?;
    lua.globals().set("ColorMapper", class)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lua() -> Lua {
        let lua = Lua::new();
        register(&lua).unwrap();
        lua
    }

    #[test]
    fn test_color_from_lua_forms() {
        let lua = Lua::new();
        let expected = Color::new(0x12, 0x34, 0x56);

        assert_eq!(color_from_lua(&Value::Integer(0x123456)).unwrap(), expected);
        assert_eq!(color_from_lua(&Value::Number(1193046.0)).unwrap(), expected);

        let s = Value::String(lua.create_string("#123456").unwrap());
        assert_eq!(color_from_lua(&s).unwrap(), expected);

        let t = lua.create_table().unwrap();
        t.set("red", 0x12).unwrap();
        t.set("green", 0x34).unwrap();
        t.set("blue", 0x56).unwrap();
        assert_eq!(color_from_lua(&Value::Table(t)).unwrap(), expected);
    }

    #[test]
    fn test_color_from_lua_ignores_alpha() {
        let color = color_from_lua(&Value::Integer(0xFF12_3456)).unwrap();
        assert_eq!(color, Color::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_color_from_lua_rejects() {
        let lua = Lua::new();
        assert!(color_from_lua(&Value::Integer(-1)).is_err());
        assert!(color_from_lua(&Value::Integer(0x1_0000_0000)).is_err());
        assert!(color_from_lua(&Value::Number(1.5)).is_err());
        assert!(color_from_lua(&Value::Nil).is_err());
        assert!(color_from_lua(&Value::Boolean(true)).is_err());

        let s = Value::String(lua.create_string("red").unwrap());
        assert!(color_from_lua(&s).is_err());

        let t = lua.create_table().unwrap();
        t.set("red", 256).unwrap();
        t.set("green", 0).unwrap();
        t.set("blue", 0).unwrap();
        assert!(color_from_lua(&Value::Table(t)).is_err());
    }

    #[test]
    fn test_color_to_lua() {
        let lua = Lua::new();
        let t = color_to_lua(&lua, Color::new(0xF2, 0xF2, 0xFF)).unwrap();
        assert_eq!(t.get::<u8>("red").unwrap(), 0xF2);
        assert_eq!(t.get::<u8>("green").unwrap(), 0xF2);
        assert_eq!(t.get::<u8>("blue").unwrap(), 0xFF);
        assert_eq!(t.get::<u32>("rgb").unwrap(), 0xF2F2FF);
        assert_eq!(t.get::<String>("hex").unwrap(), "#F2F2FF");
    }

    #[test]
    fn test_keyed_mapping_sorted_by_key() {
        let lua = lua();
        let ud: mlua::AnyUserData = lua
            .load(r##"return ColorMapper.new({ ["#0000FF"] = 3, ["#FF0000"] = 1, ["#00FF00"] = 2 })"##)
            .eval()
            .unwrap();
        let mapper = ud.borrow::<LuaColorMapper>().unwrap();
        let keys: Vec<String> = mapper.mapper().iter().map(|e| e.color.to_string()).collect();
        assert_eq!(keys, vec!["#0000FF", "#00FF00", "#FF0000"]);
    }

    #[test]
    fn test_pair_sequence_keeps_order() {
        let lua = lua();
        let ud: mlua::AnyUserData = lua
            .load(r##"return ColorMapper.new({ { "#FF0000", 1 }, { "#0000FF", 3 }, { "#00FF00", 2 } })"##)
            .eval()
            .unwrap();
        let mapper = ud.borrow::<LuaColorMapper>().unwrap();
        let keys: Vec<String> = mapper.mapper().iter().map(|e| e.color.to_string()).collect();
        assert_eq!(keys, vec!["#FF0000", "#0000FF", "#00FF00"]);
    }

    #[test]
    fn test_keyed_duplicates_resolve_deterministically() {
        let lua = lua();
        let value: String = lua
            .load(r##"
                local m = ColorMapper.new({ ["#ff0000"] = "lower", ["#FF0000"] = "upper" })
                return m:value_for_nearest_color(0xFF0000)
            "##)
            .eval()
            .unwrap();
        assert_eq!(value, "lower");
    }

    #[test]
    fn test_mixed_table_rejected() {
        let lua = lua();
        let result: LuaResult<Value> = lua
            .load(r##"return ColorMapper.new({ { "#FF0000", 1 }, ["#00FF00"] = 2 })"##)
            .eval();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot mix"), "unexpected error: {err}");
    }

    #[test]
    fn test_pair_sequence_with_hole_rejected() {
        let lua = lua();
        let result: LuaResult<Value> = lua
            .load(r##"return ColorMapper.new({ { "#FF0000", 1 }, nil, { "#00FF00", 2 } })"##)
            .eval();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("without holes"), "unexpected error: {err}");
        assert!(!err.contains("cannot mix"), "unexpected error: {err}");
    }

    #[test]
    fn test_bad_pair_entry_rejected() {
        let lua = lua();
        let result: LuaResult<Value> = lua
            .load(r##"return ColorMapper.new({ { "#FF0000", 1 }, "#00FF00" })"##)
            .eval();
        assert!(result.is_err());
    }

    #[test]
    fn test_non_string_key_rejected() {
        let lua = lua();
        let result: LuaResult<Value> = lua.load(r##"return ColorMapper.new({ [42] = 1 })"##).eval();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid color key"), "unexpected error: {err}");
    }

    #[test]
    fn test_tostring_and_len() {
        let lua = lua();
        let (text, len, method_len): (String, usize, usize) = lua
            .load(r##"
                local m = ColorMapper.new({ ["#FF0000"] = 1, ["#00FF00"] = 2 })
                return tostring(m), #m, m:len()
            "##)
            .eval()
            .unwrap();
        assert_eq!(text, "ColorMapper(2 entries)");
        assert_eq!(len, 2);
        assert_eq!(method_len, 2);
    }
}
