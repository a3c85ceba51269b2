pub mod lua_color_mapper;
pub mod lua_runtime;

pub use lua_color_mapper::LuaColorMapper;
pub use lua_runtime::{LuaRuntime, ScriptResult};
