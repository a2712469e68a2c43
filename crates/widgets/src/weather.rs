use crate::{
    icons::{icon_path, resolve_icon},
    markup::Markup,
};
use iced::{
    widget::{column, container, image, row, svg, text, Column},
    Alignment, Background, Border, Element, Length,
};
use sidebar_config::WeatherConfig;
use sidebar_core::{
    event::Message,
    state::{as_number, as_text, is_truthy, read_value, StateStore, StateValue},
};
use sidebar_theme::Theme;
use std::path::PathBuf;

pub const WEATHER_NO_DATA: &str = "Keine Wetterdaten verfügbar.";

pub const DEFAULT_TEMPERATURE_ID: &str = "0_userdata.0.Weather.Ecowitt.outside.temperature_C";
pub const DEFAULT_CONDITION_ID: &str = "0_userdata.0.Weather.Brightsky.hourly-00.condition";
pub const DEFAULT_HUMIDITY_ID: &str = "0_userdata.0.Klima.Aussenfeuchte";
pub const DEFAULT_TEMP_MIN_ID: &str = "0_userdata.0.Weather.Brightsky.current.temp_min_today";
pub const DEFAULT_TEMP_MAX_ID: &str = "0_userdata.0.Weather.Brightsky.current.temp_max_today";
pub const DEFAULT_WIND_SPEED_ID: &str = "0_userdata.0.Weather.Ecowitt.wind.speed_kmh";

/// State ids and icon settings, resolved once when the widget is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherKeys {
    pub temperature: String,
    pub condition:   String,
    pub humidity:    String,
    pub temp_min:    String,
    pub temp_max:    String,
    pub wind_speed:  String,
    /// Empty = no explicit icon state.
    pub icon:        String,
    /// Empty = no warnings state.
    pub warnings:    String,
    pub image_set:   u32,
    pub image_type:  String,
    pub assets_dir:  PathBuf,
}

impl WeatherKeys {
    /// Fill every unset id with its built-in default.
    pub fn from_config(cfg: &WeatherConfig) -> Self {
        let or = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() { fallback } else { value }.to_string()
        };

        Self {
            temperature: or(&cfg.temperature_id, DEFAULT_TEMPERATURE_ID),
            condition:   or(&cfg.condition_id, DEFAULT_CONDITION_ID),
            humidity:    or(&cfg.humidity_id, DEFAULT_HUMIDITY_ID),
            temp_min:    or(&cfg.temp_min_id, DEFAULT_TEMP_MIN_ID),
            temp_max:    or(&cfg.temp_max_id, DEFAULT_TEMP_MAX_ID),
            wind_speed:  or(&cfg.wind_speed_id, DEFAULT_WIND_SPEED_ID),
            icon:        cfg.icon_id.trim().to_string(),
            warnings:    cfg.warnings_html_id.trim().to_string(),
            image_set:   if cfg.image_set == 0 { 1 } else { cfg.image_set },
            image_type:  or(&cfg.image_type, "svg"),
            assets_dir:  cfg.assets_dir.clone(),
        }
    }
}

impl Default for WeatherKeys {
    fn default() -> Self {
        Self::from_config(&WeatherConfig::default())
    }
}

/// Everything the weather panel displays, derived from one store snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReadout {
    pub icon_code:   Option<String>,
    pub icon:        Option<PathBuf>,
    pub temperature: String,
    pub description: String,
    pub high_low:    String,
    pub wind:        String,
    pub humidity:    String,
    /// Set only when neither temperature nor condition is available.
    pub error:       Option<&'static str>,
    pub warnings:    Option<Markup>,
}

impl WeatherReadout {
    /// Recompute every field from scratch.  Nothing is carried over from a
    /// previous readout, so a value that disappears blanks its field.
    pub fn from_store<S: StateStore + ?Sized>(store: &S, keys: &WeatherKeys) -> Self {
        let temp = read_value(store, &keys.temperature);
        let cond = read_value(store, &keys.condition);
        let humidity = read_value(store, &keys.humidity);
        let t_min = read_value(store, &keys.temp_min);
        let t_max = read_value(store, &keys.temp_max);
        let wind = read_value(store, &keys.wind_speed);
        let icon = read_value(store, &keys.icon);
        let warnings = read_value(store, &keys.warnings);

        let code = resolve_icon(icon.as_ref(), cond.as_ref());

        Self {
            icon:        Some(icon_path(&keys.assets_dir, keys.image_set, &code, &keys.image_type)),
            icon_code:   Some(code),
            temperature: number(&temp).map(celsius).unwrap_or_default(),
            description: cond.as_ref().map(as_text).unwrap_or_default(),
            high_low:    high_low(number(&t_max), number(&t_min)),
            wind:        number(&wind)
                .map(|w| format!("Wind: {} m/s", to_fixed(w, 1)))
                .unwrap_or_default(),
            humidity:    number(&humidity)
                .map(|h| format!("Luftfeuchtigkeit: {} %", to_fixed(h, 0)))
                .unwrap_or_default(),
            error:       (temp.is_none() && cond.is_none()).then_some(WEATHER_NO_DATA),
            warnings:    warnings.and_then(warning_markup),
        }
    }
}

fn number(value: &Option<StateValue>) -> Option<f64> {
    value.as_ref().and_then(as_number)
}

fn celsius(value: f64) -> String {
    format!("{}°C", to_fixed(value, 1))
}

/// Render `value` with `digits` decimals, rounding exact ties away from zero
/// the way the dashboard's `toFixed` does (`21.25` → `"21.3"`, `-2.5` → `"-3"`).
///
/// `format!("{:.N}")` rounds ties to even, which shows up on ordinary sensor
/// readings such as `62.5 %`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Exact decimal expansion: every finite f64 ends within 1074 places.
    let exact = format!("{:.1074}", value.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part.bytes().chain(frac.bytes().take(digits)).collect();
    kept.resize(int_part.len() + digits, b'0');

    if frac.as_bytes().get(digits).is_some_and(|&d| d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|&b| char::from(b)));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|&b| char::from(b)));
    }
    out
}

/// `"H: 5.2°C   T: -1.0°C"`; each half is left out when its value is missing.
pub fn high_low(max: Option<f64>, min: Option<f64>) -> String {
    let parts: Vec<String> = [
        max.map(|v| format!("H: {}", celsius(v))),
        min.map(|v| format!("T: {}", celsius(v))),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.join("   ")
}

fn warning_markup(value: StateValue) -> Option<Markup> {
    match value {
        StateValue::String(s) if !s.is_empty() => Some(Markup::Html(s)),
        other if is_truthy(&other) => Some(Markup::Text(as_text(&other))),
        _ => None,
    }
}

/// Current conditions panel: icon, temperature, description, high/low,
/// wind, humidity, warnings.
#[derive(Debug, Clone)]
pub struct WeatherWidget {
    keys:         WeatherKeys,
    readout:      WeatherReadout,
    icon_on_disk: bool,
}

impl WeatherWidget {
    /// Build the empty skeleton; the first [`refresh`](Self::refresh) fills it.
    pub fn new(keys: WeatherKeys) -> Self {
        Self {
            keys,
            readout: WeatherReadout::default(),
            icon_on_disk: false,
        }
    }

    pub fn keys(&self) -> &WeatherKeys {
        &self.keys
    }

    pub fn readout(&self) -> &WeatherReadout {
        &self.readout
    }

    pub fn refresh<S: StateStore + ?Sized>(&mut self, store: &S) {
        self.readout = WeatherReadout::from_store(store, &self.keys);
        self.icon_on_disk = self.readout.icon.as_ref().is_some_and(|p| p.exists());
    }

    pub fn view<'a>(&'a self, theme: &'a Theme) -> Element<'a, Message> {
        let r = &self.readout;
        let small = theme.font_size - 1.0;
        let fg = theme.foreground.to_iced();

        let mut info = Column::new().spacing(theme.gap as f32 / 2.0);
        if !r.temperature.is_empty() {
            info = info.push(text(r.temperature.as_str()).size(theme.font_size * 2.0).color(fg));
        }
        for line in [&r.description, &r.high_low, &r.wind, &r.humidity] {
            if !line.is_empty() {
                info = info.push(text(line.as_str()).size(small).color(fg));
            }
        }
        if let Some(message) = r.error {
            info = info.push(text(message).size(small).color(theme.error.to_iced()));
        }

        let mut top = row![].spacing(theme.gap as f32 * 2.0).align_y(Alignment::Center);
        if let Some(path) = r.icon.as_ref().filter(|_| self.icon_on_disk) {
            let size = Length::Fixed(theme.icon_size);
            let icon: Element<'a, Message> = if self.keys.image_type.eq_ignore_ascii_case("svg") {
                svg(svg::Handle::from_path(path)).width(size).height(size).into()
            } else {
                image(image::Handle::from_path(path)).width(size).height(size).into()
            };
            top = top.push(icon);
        }
        top = top.push(info);

        let mut body = column![top].spacing(theme.gap as f32);
        if let Some(warnings) = &r.warnings {
            body = body.push(
                text(warnings.display_text())
                    .size(small)
                    .color(theme.error.to_iced()),
            );
        }

        let panel_bg = theme.panel_background();
        let radius = theme.border_radius;
        container(body)
            .width(Length::Fill)
            .padding(theme.padding)
            .style(move |_| container::Style {
                background: Some(Background::Color(panel_bg.to_iced())),
                border: Border {
                    radius: radius.into(),
                    ..Border::default()
                },
                ..container::Style::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sidebar_core::StateSnapshot;

    fn keys() -> WeatherKeys {
        WeatherKeys::from_config(&WeatherConfig {
            icon_id: "weather.icon".into(),
            warnings_html_id: "weather.warnings".into(),
            ..WeatherConfig::default()
        })
    }

    #[test]
    fn defaults_fill_empty_ids() {
        let k = WeatherKeys::from_config(&WeatherConfig {
            temperature_id: "  ".into(),
            humidity_id: "my.humidity".into(),
            image_set: 0,
            image_type: String::new(),
            ..WeatherConfig::default()
        });
        assert_eq!(k.temperature, DEFAULT_TEMPERATURE_ID);
        assert_eq!(k.humidity, "my.humidity");
        assert_eq!(k.icon, "");
        assert_eq!(k.image_set, 1);
        assert_eq!(k.image_type, "svg");
    }

    #[test]
    fn temperature_without_condition_is_not_an_error() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_TEMPERATURE_ID, 21.3);

        let r = WeatherReadout::from_store(&store, &keys());
        assert_eq!(r.temperature, "21.3°C");
        assert_eq!(r.description, "");
        assert_eq!(r.error, None);
    }

    #[test]
    fn no_temperature_and_no_condition_is_an_error() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_HUMIDITY_ID, 60);

        let r = WeatherReadout::from_store(&store, &keys());
        assert_eq!(r.error, Some(WEATHER_NO_DATA));
        assert_eq!(r.humidity, "Luftfeuchtigkeit: 60 %");
        assert_eq!(r.icon_code.as_deref(), Some("01d"));
    }

    #[test]
    fn field_formatting() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_TEMPERATURE_ID, "7");
        store.set(DEFAULT_CONDITION_ID, "leichter Regen");
        store.set(DEFAULT_TEMP_MAX_ID, 9.46);
        store.set(DEFAULT_TEMP_MIN_ID, -1);
        store.set(DEFAULT_WIND_SPEED_ID, 3.26);
        store.set(DEFAULT_HUMIDITY_ID, 81.6);

        let r = WeatherReadout::from_store(&store, &keys());
        assert_eq!(r.temperature, "7.0°C");
        assert_eq!(r.description, "leichter Regen");
        assert_eq!(r.high_low, "H: 9.5°C   T: -1.0°C");
        assert_eq!(r.wind, "Wind: 3.3 m/s");
        assert_eq!(r.humidity, "Luftfeuchtigkeit: 82 %");
        assert_eq!(r.icon_code.as_deref(), Some("09d"));
        assert_eq!(
            r.icon,
            Some(PathBuf::from("assets/img/sidebar/weather/1/09d.svg"))
        );
    }

    #[test]
    fn to_fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed(21.25, 1), "21.3");
        assert_eq!(to_fixed(0.25, 1), "0.3");
        assert_eq!(to_fixed(62.5, 0), "63");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(-1.25, 1), "-1.3");
        assert_eq!(to_fixed(9.96, 1), "10.0");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(7.0, 1), "7.0");
        assert_eq!(to_fixed(-0.0, 1), "0.0");
    }

    #[test]
    fn to_fixed_follows_the_stored_binary_value() {
        // 1.005 is stored slightly below the tie, 2.675 as well.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(2.675, 2), "2.67");
        // 0.35 is stored slightly below, 0.45 slightly above.
        assert_eq!(to_fixed(0.35, 1), "0.3");
        assert_eq!(to_fixed(0.45, 1), "0.5");
    }

    #[test]
    fn tie_readings_match_the_dashboard() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_TEMPERATURE_ID, 21.25);
        store.set(DEFAULT_HUMIDITY_ID, 62.5);
        store.set(DEFAULT_WIND_SPEED_ID, 0.25);
        store.set(DEFAULT_TEMP_MIN_ID, -2.25);

        let r = WeatherReadout::from_store(&store, &keys());
        assert_eq!(r.temperature, "21.3°C");
        assert_eq!(r.humidity, "Luftfeuchtigkeit: 63 %");
        assert_eq!(r.wind, "Wind: 0.3 m/s");
        assert_eq!(r.high_low, "T: -2.3°C");
    }

    #[test]
    fn high_low_omits_missing_halves() {
        assert_eq!(high_low(Some(5.2), None), "H: 5.2°C");
        assert_eq!(high_low(None, Some(-3.0)), "T: -3.0°C");
        assert_eq!(high_low(None, None), "");
    }

    #[test]
    fn explicit_icon_wins_only_when_well_formed() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_CONDITION_ID, "leichter Regen");
        store.set("weather.icon", "04n");
        assert_eq!(WeatherReadout::from_store(&store, &keys()).icon_code.as_deref(), Some("04n"));

        store.set("weather.icon", "rain");
        assert_eq!(WeatherReadout::from_store(&store, &keys()).icon_code.as_deref(), Some("09d"));
    }

    #[test]
    fn warnings_html_text_and_cleared() {
        let store = StateSnapshot::new();
        store.set("weather.warnings", "<b>Sturmböen</b>");
        assert_eq!(
            WeatherReadout::from_store(&store, &keys()).warnings,
            Some(Markup::Html("<b>Sturmböen</b>".into()))
        );

        store.set("weather.warnings", 2);
        assert_eq!(
            WeatherReadout::from_store(&store, &keys()).warnings,
            Some(Markup::Text("2".into()))
        );

        store.set("weather.warnings", "");
        assert_eq!(WeatherReadout::from_store(&store, &keys()).warnings, None);
    }

    #[test]
    fn non_numeric_values_render_blank() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_TEMPERATURE_ID, "n/a");

        let r = WeatherReadout::from_store(&store, &keys());
        assert_eq!(r.temperature, "");
        // The state exists, so this is not the "no data" case.
        assert_eq!(r.error, None);
    }

    #[test]
    fn refresh_is_idempotent_and_blanks_vanished_values() {
        let store = StateSnapshot::new();
        store.set(DEFAULT_TEMPERATURE_ID, 12.0);
        store.set(DEFAULT_WIND_SPEED_ID, json!(4));

        let mut widget = WeatherWidget::new(keys());
        assert_eq!(widget.readout(), &WeatherReadout::default());

        widget.refresh(&store);
        let first = widget.readout().clone();
        widget.refresh(&store);
        assert_eq!(widget.readout(), &first);

        store.remove(DEFAULT_WIND_SPEED_ID);
        widget.refresh(&store);
        assert_eq!(widget.readout().wind, "");
        assert_eq!(widget.readout().temperature, "12.0°C");
    }
}
