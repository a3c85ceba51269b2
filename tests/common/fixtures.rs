//! Test fixtures and constants.

/// Pad LED palette as a Lua pair sequence, in controller order
pub const PAD_PALETTE_LUA: &str = r##"{
    { "#C50A08", 1 },
    { "#32BE44", 2 },
    { "#42D4F4", 3 },
    { "#F8D200", 4 },
    { "#0044FF", 5 },
    { "#AF00CC", 6 },
    { "#FCA6D7", 7 },
    { "#F2F2FF", 8 },
}"##;

/// Config used by script tests
pub const CONFIG: &str = r##"
default_palette: starlight

palettes:
  starlight:
    description: Pad LEDs
    colors:
      "#C50A08": 1
      "#32BE44": 2
      "#42D4F4": 3
      "#F8D200": 4
      "#0044FF": 5
      "#AF00CC": 6
      "#FCA6D7": 7
      "#F2F2FF": 8

  mono:
    colors:
      "#000000": { code: 0, name: off }
      "#FFFFFF": { code: 127, name: full }

  broken:
    colors:
      "#C50A08": 1
      "C50A08": 2
"##;
