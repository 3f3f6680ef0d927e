//! Typed animation values
//!
//! Every animatable endpoint is one of a closed set of shapes. Scenario files
//! and JSON payloads deserialize into [`Value`] untagged, so `0.5`, `"#ff0000"`,
//! `"20px"`, `[0, 50, 100]` and `{ property = "translateY", value = 40 }` all
//! land in the right variant.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An interpolatable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Color(Rgb),
    Text(String),
    Keyframes(Vec<Value>),
    Structured(BTreeMap<String, Value>),
}

impl Value {
    /// Build the `{ property, value }` shape expected by the `transform` sink
    pub fn transform(function: &str, value: impl Into<Value>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("property".to_string(), Value::Text(function.to_string()));
        map.insert("value".to_string(), value.into());
        Value::Structured(map)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_float_prefix(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key on a structured value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Structured(map) => map.get(key),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Color(_) => "color",
            Value::Text(_) => "text",
            Value::Keyframes(_) => "keyframes",
            Value::Structured(_) => "structured",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Color(c) => write!(f, "{}", c),
            Value::Text(s) => f.write_str(s),
            Value::Keyframes(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Structured(map) => {
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Rgb> for Value {
    fn from(c: Rgb) -> Self {
        Value::Color(c)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Keyframes(items.into_iter().map(Into::into).collect())
    }
}

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the `#` is optional, hex digits are case-insensitive)
    pub fn parse(input: &str) -> Result<Self> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(input.to_string()));
        }

        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor(input.to_string()))
        };

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(Error::InvalidColor(input.to_string())),
        }
    }

    /// Per-channel blend in 0–255 space, rounded half up and clamped
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| {
            let v = a as f64 + (b as f64 - a as f64) * t;
            (v + 0.5).floor().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if !value.starts_with('#') {
            return Err(Error::InvalidColor(value));
        }
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

fn float_prefix() -> &'static Regex {
    static FLOAT: OnceLock<Regex> = OnceLock::new();
    FLOAT.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

/// Parse the longest leading float in `s`, ignoring any trailing unit.
///
/// `"20px"` → 20, `"  -1.5e2deg"` → -150, `"px20"` → `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let caps = float_prefix().captures(s)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Render a number for a style string, folding `-0` into `0`
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgb::parse("#ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::parse("#FFF").unwrap(), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::parse("0a0B0c").unwrap(), Rgb::new(10, 11, 12));
        assert!(Rgb::parse("#ff80").is_err());
        assert!(Rgb::parse("#gggggg").is_err());
        assert!(Rgb::parse("#ééé").is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Rgb::new(0, 128, 255).to_string(), "#0080ff");
    }

    #[test]
    fn test_color_lerp_rounds_half_up() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.lerp(&white, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(black.lerp(&white, 0.0), black);
        assert_eq!(black.lerp(&white, 1.0), white);
    }

    #[test]
    fn test_color_lerp_clamps_overshoot() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.lerp(&white, 1.4), white);
        assert_eq!(black.lerp(&white, -0.3), black);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("20px"), Some(20.0));
        assert_eq!(parse_float_prefix("  -1.5e2deg"), Some(-150.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("px20"), None);
        assert_eq!(parse_float_prefix("solid"), None);
    }

    #[test]
    fn test_deserialize_untagged() {
        let v: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, Value::Number(1.5));

        let v: Value = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(v, Value::Color(Rgb::new(0, 255, 0)));

        let v: Value = serde_json::from_str("\"20px\"").unwrap();
        assert_eq!(v, Value::Text("20px".to_string()));

        let v: Value = serde_json::from_str("[0, 50, 100]").unwrap();
        assert_eq!(v, Value::from(vec![0.0, 50.0, 100.0]));

        let v: Value = serde_json::from_str(r#"{"property": "translateY", "value": 40}"#).unwrap();
        assert_eq!(v, Value::transform("translateY", 40.0));
    }

    #[test]
    fn test_malformed_hash_stays_text() {
        let v: Value = serde_json::from_str("\"#zzz\"").unwrap();
        assert_eq!(v, Value::Text("#zzz".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(12.0).to_string(), "12");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Color(Rgb::new(1, 2, 3)).to_string(), "#010203");
    }
}
