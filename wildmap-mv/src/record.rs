//! Feed documents and recording records
//!
//! Feeds come from hand-exported files or straight from the xeno-canto API,
//! so nothing in a record is trusted to be present or well-typed. Display
//! fields degrade to empty strings and coordinates are parsed leniently:
//! a record only survives if both `lat` and `lon` yield a usable number.
//!
//! Values are read with JavaScript's truthiness and string conversion, so
//! a feed that works in a browser map works here too.

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Number, Value};

/// A static feed: `{ "recordings": [ ... ] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedDocument {
    /// Missing or `null` reads as empty
    #[serde(default)]
    pub recordings: Option<Vec<Value>>,
}

impl FeedDocument {
    /// Parse a feed. A `null` entry in `recordings` fails the whole feed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let doc: Self = serde_json::from_slice(bytes)?;
        if let Some(index) = doc.recordings.iter().flatten().position(Value::is_null) {
            return Err(serde_json::Error::custom(format!(
                "recording {} is null",
                index
            )));
        }
        Ok(doc)
    }

    /// Records that are JSON objects; anything else in the array is skipped
    pub fn records(&self) -> Vec<Recording> {
        self.recordings
            .iter()
            .flatten()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }
}

/// One wildlife audio observation as it appears in a feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recording {
    /// Common name
    #[serde(default)]
    pub en: Option<Value>,
    /// Genus
    #[serde(default)]
    pub gen: Option<Value>,
    /// Species
    #[serde(default)]
    pub sp: Option<Value>,
    /// Location label
    #[serde(default)]
    pub loc: Option<Value>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,
    /// Audio URL
    #[serde(default)]
    pub file: Option<Value>,
    /// Sonogram thumbnails, `{ "small": "//host/path.png", ... }`
    #[serde(default)]
    pub sono: Option<Value>,
}

impl Recording {
    /// `(lon, lat)` when both coordinates parse
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = parse_coordinate(self.lat.as_ref()?)?;
        let lon = parse_coordinate(self.lon.as_ref()?)?;
        Some((lon, lat))
    }

    /// Protocol-relative small sonogram path, if present and non-empty
    pub fn sonogram_small(&self) -> Option<&str> {
        self.sono
            .as_ref()?
            .get("small")?
            .as_str()
            .filter(|s| !s.is_empty())
    }
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        // Integral floats print without a fraction, as in JavaScript
        Some(v) if n.is_f64() => v.to_string(),
        _ => n.to_string(),
    }
}

/// JavaScript `String(value)`; `null` inside arrays joins as empty
fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Render an optional value as display text: falsy values (`null`,
/// `false`, `0`, `""`, missing) become empty, the rest are stringified.
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        Some(v) if is_truthy(v) => js_string(v),
        _ => String::new(),
    }
}

/// Parse a latitude or longitude.
///
/// - falsy values (`0`, `""`, `null`, `false`) are rejected
/// - numbers are taken as-is
/// - anything else is stringified and parsed by its longest leading
///   decimal prefix (`"27.5abc"` → 27.5, `"0"` → 0.0, `[27.5]` → 27.5)
/// - non-finite results are rejected
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    if !is_truthy(value) {
        return None;
    }
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        other => parse_float_prefix(&js_string(other)),
    };
    parsed.filter(|v| v.is_finite())
}

/// Longest leading decimal literal of `s`, after leading whitespace
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
