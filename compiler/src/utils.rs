use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z\d])([A-Z])").unwrap();
    static ref CAMELIZE_BOUNDARY: Regex = Regex::new(r"(?:^|_)(.)").unwrap();
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Converts `snake_case` (or already camel) names to `UpperCamelCase`.
///
/// The first character and every character following an underscore are
/// upper-cased and that underscore is consumed; everything else is kept. So
/// `device_id` and `deviceId` become `DeviceId`, `a_` stays `A_` and
/// `device__id` becomes `Device_id`.
pub fn camelize(s: &str) -> String {
    CAMELIZE_BOUNDARY
        .replace_all(s, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Converts `CamelCase` to `snake_case`, keeping acronyms together
/// (`HTTPServer` becomes `http_server`).
pub fn underscore(s: &str) -> String {
    let s = ACRONYM_BOUNDARY.replace_all(s, "${1}_${2}");
    let s = WORD_BOUNDARY.replace_all(&s, "${1}_${2}");
    s.replace('-', "_").to_lowercase()
}

/// `SCREAMING_SNAKE_CASE` form used for macro and constant symbols.
pub fn macro_case(s: &str) -> String {
    underscore(s).to_uppercase()
}

#[test]
fn camelize_snake_and_camel_names() {
    assert_eq!(camelize("device_id"), "DeviceId");
    assert_eq!(camelize("deviceId"), "DeviceId");
    assert_eq!(camelize("field_0"), "Field0");
    assert_eq!(camelize(""), "");
}

#[test]
fn camelize_keeps_unpaired_underscores() {
    assert_eq!(camelize("a_"), "A_");
    assert_eq!(camelize("device__id"), "Device_id");
    assert_eq!(camelize("a__B"), "A_B");
    assert_eq!(camelize("_private"), "_private");
}

#[test]
fn enum_value_symbols() {
    assert_eq!(camelize(&underscore("BOLT_STATE_RETRACTED")), "BoltStateRetracted");
    assert_eq!(macro_case("kitchenHub"), "KITCHEN_HUB");
}
