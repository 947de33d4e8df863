//! Named-color table and color-property normalization.

use crate::runtime::value::Value;

/// Properties whose string values are colors.
pub const COLOR_PROPERTIES: &[&str] = &[
    "color", "fill", "fillColor", "stroke", "strokeColor", "backgroundColor",
];

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black",   "#000000"),
    ("white",   "#ffffff"),
    ("red",     "#ff0000"),
    ("green",   "#008000"),
    ("blue",    "#0000ff"),
    ("yellow",  "#ffff00"),
    ("orange",  "#ffa500"),
    ("purple",  "#800080"),
    ("pink",    "#ffc0cb"),
    ("brown",   "#a52a2a"),
    ("gray",    "#808080"),
    ("grey",    "#808080"),
    ("cyan",    "#00ffff"),
    ("magenta", "#ff00ff"),
    ("lime",    "#00ff00"),
    ("navy",    "#000080"),
    ("teal",    "#008080"),
    ("maroon",  "#800000"),
    ("olive",   "#808000"),
    ("silver",  "#c0c0c0"),
    ("gold",    "#ffd700"),
    ("indigo",  "#4b0082"),
    ("violet",  "#ee82ee"),
    ("coral",   "#ff7f50"),
    ("salmon",  "#fa8072"),
    ("turquoise", "#40e0d0"),
];

pub fn named_color_hex(name: &str) -> Option<&'static str> {
    NAMED_COLORS.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

pub fn is_color_property(name: &str) -> bool {
    COLOR_PROPERTIES.contains(&name)
}

/// Map a named color to hex. Hex, `rgb(...)`, `hsl(...)` and unknown strings
/// pass through untouched.
pub fn resolve_color(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('#') || trimmed.starts_with("rgb") || trimmed.starts_with("hsl") {
        return trimmed.to_string();
    }
    named_color_hex(trimmed).map(str::to_string).unwrap_or_else(|| trimmed.to_string())
}

/// Normalize a property value if the property carries a color.
pub fn normalize_property(name: &str, value: Value) -> Value {
    match value {
        Value::Str(s) if is_color_property(name) => Value::Str(resolve_color(&s)),
        other => other,
    }
}
