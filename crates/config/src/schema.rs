use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `sidebar.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Surface placement and state source.
    pub global: GlobalConfig,
    /// Calendar + bin schedule panel.
    pub calendar: CalendarConfig,
    /// Weather panel.
    pub weather: WeatherConfig,
    /// Theme / visual settings.
    pub theme: ThemeConfig,
}

/// Global sidebar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Sidebar width in logical pixels.
    pub width: u32,
    /// Screen edge the sidebar is anchored to.
    pub position: Position,
    /// Reserve an exclusive zone so windows don't overlap the sidebar.
    pub exclusive_zone: bool,
    /// Overall background opacity (0.0 – 1.0).
    pub opacity: f32,
    /// JSON snapshot of the backend states.  `None` = next to the config file.
    pub states_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            width: 320,
            position: Position::Right,
            exclusive_zone: true,
            opacity: 0.95,
            states_file: None,
        }
    }
}

/// Sidebar position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default]
    Right,
}

pub const DEFAULT_TRASH_HTML_ID: &str = "0_userdata.0.vis.trash.MiniHTML";
pub const DEFAULT_TRASH_BUTTON_ID: &str = "0_userdata.0.vis.trash.Tonne_draussen";
pub const DEFAULT_ICAL_STATE_ID: &str = "ical.0.data.table";

/// `[calendar]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub enabled: bool,
    /// Calendar sources, each backed by one ical table state.
    pub calendars: Vec<CalendarSourceConfig>,
    /// State holding pre-rendered bin schedule HTML.
    pub trash_html_state_id: String,
    /// Boolean state toggled by the "bin out" button.
    pub trash_button_state_id: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calendars: Vec::new(),
            trash_html_state_id: DEFAULT_TRASH_HTML_ID.to_string(),
            trash_button_state_id: DEFAULT_TRASH_BUTTON_ID.to_string(),
        }
    }
}

/// One calendar source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSourceConfig {
    /// Display name; used when the table rows carry no calendar name.
    pub name: String,
    #[serde(default = "default_ical_state_id")]
    pub state_id: String,
    /// Accent colour for this calendar's events (hex).
    #[serde(default)]
    pub color: Option<String>,
}

impl CalendarSourceConfig {
    pub fn new(name: impl Into<String>, state_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_id: state_id.into(),
            color: None,
        }
    }
}

fn default_ical_state_id() -> String {
    DEFAULT_ICAL_STATE_ID.to_string()
}

/// `[weather]` section.  Empty ids fall back to the built-in defaults when
/// the widget resolves its keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub temperature_id: String,
    pub condition_id: String,
    pub humidity_id: String,
    pub temp_min_id: String,
    pub temp_max_id: String,
    pub wind_speed_id: String,
    /// Optional state with an explicit icon code such as `"03d"`.
    pub icon_id: String,
    /// Optional state with warning HTML.
    pub warnings_html_id: String,
    /// Icon set number (sub-directory of the weather icon folder).
    pub image_set: u32,
    /// Icon file extension.
    pub image_type: String,
    /// Root of the asset tree holding `img/sidebar/weather/...`.
    pub assets_dir: PathBuf,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature_id: String::new(),
            condition_id: String::new(),
            humidity_id: String::new(),
            temp_min_id: String::new(),
            temp_max_id: String::new(),
            wind_speed_id: String::new(),
            icon_id: String::new(),
            warnings_html_id: String::new(),
            image_set: 1,
            image_type: "svg".to_string(),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// Theme / styling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Sidebar background color (hex, e.g. `"#1e1e2e"`).
    pub background: String,
    /// Primary text/foreground color.
    pub foreground: String,
    /// Accent / highlight color (headings, navigation, running events).
    pub accent: String,
    /// Color of events that already ended.
    pub muted: String,
    /// Color of the "no data" banners.
    pub error: String,
    /// Font size in points.
    pub font_size: f32,
    /// Corner radius for panel containers (pixels).
    pub border_radius: f32,
    /// Inner padding for each panel (pixels).
    pub padding: u16,
    /// Gap between rows (pixels).
    pub gap: u16,
    /// Weather icon edge length (pixels).
    pub icon_size: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:    "#1e1e2e".to_string(), // Catppuccin Mocha: base
            foreground:    "#cdd6f4".to_string(), // Catppuccin Mocha: text
            accent:        "#cba6f7".to_string(), // Catppuccin Mocha: mauve
            muted:         "#6c7086".to_string(), // Catppuccin Mocha: overlay0
            error:         "#f38ba8".to_string(), // Catppuccin Mocha: red
            font_size:     14.0,
            border_radius: 8.0,
            padding:       12,
            gap:           6,
            icon_size:     64.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: SidebarConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.global.position, Position::Right);
        assert_eq!(cfg.calendar.trash_html_state_id, DEFAULT_TRASH_HTML_ID);
        assert_eq!(cfg.weather.image_set, 1);
        assert_eq!(cfg.weather.image_type, "svg");
    }

    #[test]
    fn calendar_sources_default_their_state_id() {
        let cfg: SidebarConfig = toml::from_str(
            r##"
            [calendar]
            calendars = [
                { name = "Familie" },
                { name = "Arbeit", state_id = "ical.1.data.table", color = "#89b4fa" },
            ]
            "##,
        )
        .unwrap();

        assert_eq!(cfg.calendar.calendars[0].state_id, DEFAULT_ICAL_STATE_ID);
        assert_eq!(cfg.calendar.calendars[1].color.as_deref(), Some("#89b4fa"));
    }

    #[test]
    fn weather_section_parses_partial_overrides() {
        let cfg: SidebarConfig = toml::from_str(
            r#"
            [weather]
            temperature_id = "weather.0.temp"
            image_set = 2
            "#,
        )
        .unwrap();

        assert_eq!(cfg.weather.temperature_id, "weather.0.temp");
        assert_eq!(cfg.weather.condition_id, "");
        assert_eq!(cfg.weather.image_set, 2);
    }
}
