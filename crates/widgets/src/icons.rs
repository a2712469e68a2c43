use sidebar_core::state::{as_text, is_truthy, StateValue};
use std::path::{Path, PathBuf};

/// Clear sky; used whenever nothing more specific matches.
pub const CLEAR: &str = "01d";

/// Condition keywords → icon code.  Checked top to bottom, first hit wins.
const KEYWORDS: &[(&[&str], &str)] = &[
    (&["schnee", "snow"], "13d"),
    (&["gewitter", "thunder"], "11d"),
    (&["regen", "shower", "rain"], "09d"),
    (&["nebel", "fog"], "50d"),
    (&["wolk", "wölk", "cloud"], "03d"),
    (&["dry"], CLEAR),
];

/// Map a free-text weather condition to an icon code.
pub fn icon_for_condition(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| condition.contains(w)))
        .map_or(CLEAR, |&(_, code)| code)
}

/// Accept `raw` as an icon code if it looks like one: two digits,
/// optionally followed by `d` (day) or `n` (night).
pub fn explicit_icon_code(raw: &str) -> Option<&str> {
    let code = raw.trim();
    let bytes = code.as_bytes();
    let valid = match bytes {
        [a, b] => a.is_ascii_digit() && b.is_ascii_digit(),
        [a, b, s] => a.is_ascii_digit() && b.is_ascii_digit() && matches!(s, b'd' | b'n'),
        _ => false,
    };
    valid.then_some(code)
}

/// Pick the icon code for a weather reading: a well-formed explicit code
/// wins, otherwise the condition text decides.
pub fn resolve_icon(explicit: Option<&StateValue>, condition: Option<&StateValue>) -> String {
    if let Some(code) = explicit
        .filter(|v| is_truthy(v))
        .map(as_text)
        .as_deref()
        .and_then(explicit_icon_code)
    {
        return code.to_string();
    }

    match condition.filter(|v| is_truthy(v)) {
        Some(text) => icon_for_condition(&as_text(text)).to_string(),
        None => CLEAR.to_string(),
    }
}

/// Asset path of an icon: `<assets>/img/sidebar/weather/<set>/<code>.<ext>`.
pub fn icon_path(assets_dir: &Path, image_set: u32, code: &str, image_type: &str) -> PathBuf {
    assets_dir
        .join("img")
        .join("sidebar")
        .join("weather")
        .join(image_set.to_string())
        .join(format!("{code}.{image_type}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyword_priority() {
        assert_eq!(icon_for_condition("Schneeregen"), "13d");
        assert_eq!(icon_for_condition("Gewitter mit Regen"), "11d");
        assert_eq!(icon_for_condition("leichter Regen"), "09d");
        assert_eq!(icon_for_condition("Showers"), "09d");
        assert_eq!(icon_for_condition("Nebel"), "50d");
        assert_eq!(icon_for_condition("wolkig"), "03d");
        assert_eq!(icon_for_condition("Bewölkt"), "03d");
        assert_eq!(icon_for_condition("partly-cloudy-day"), "03d");
        assert_eq!(icon_for_condition("dry"), CLEAR);
        assert_eq!(icon_for_condition("sonnig"), CLEAR);
    }

    #[test]
    fn explicit_code_pattern() {
        assert_eq!(explicit_icon_code("09d"), Some("09d"));
        assert_eq!(explicit_icon_code(" 10n "), Some("10n"));
        assert_eq!(explicit_icon_code("04"), Some("04"));
        assert_eq!(explicit_icon_code("rain"), None);
        assert_eq!(explicit_icon_code("9d"), None);
        assert_eq!(explicit_icon_code("09x"), None);
        assert_eq!(explicit_icon_code("009d"), None);
    }

    #[test]
    fn resolution_order() {
        assert_eq!(resolve_icon(Some(&json!("09d")), Some(&json!("sonnig"))), "09d");
        assert_eq!(resolve_icon(Some(&json!("rain")), Some(&json!("leichter Regen"))), "09d");
        assert_eq!(resolve_icon(None, Some(&json!("wolkig"))), "03d");
        assert_eq!(resolve_icon(None, None), CLEAR);
        assert_eq!(resolve_icon(Some(&json!(0)), Some(&json!(""))), CLEAR);
    }

    #[test]
    fn asset_path_layout() {
        let path = icon_path(Path::new("assets"), 2, "03d", "png");
        assert_eq!(path, PathBuf::from("assets/img/sidebar/weather/2/03d.png"));
    }
}
