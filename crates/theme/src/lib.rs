pub mod colors;

pub use colors::Color;

use sidebar_config::ThemeConfig;

/// Compiled theme derived from [`ThemeConfig`].
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Theme::from_config`] is infallible; invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background:    Color,
    pub foreground:    Color,
    pub accent:        Color,
    /// Events that already ended.
    pub muted:         Color,
    /// "No data" banners.
    pub error:         Color,
    pub font_size:     f32,
    pub border_radius: f32,
    pub padding:       u16,
    pub gap:           u16,
    pub icon_size:     f32,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            background:    Color::from_hex(&cfg.background).unwrap_or(Color::BASE),
            foreground:    Color::from_hex(&cfg.foreground).unwrap_or(Color::TEXT),
            accent:        Color::from_hex(&cfg.accent).unwrap_or(Color::MAUVE),
            muted:         Color::from_hex(&cfg.muted).unwrap_or(Color::GREY),
            error:         Color::from_hex(&cfg.error).unwrap_or(Color::RED),
            font_size:     cfg.font_size,
            border_radius: cfg.border_radius,
            padding:       cfg.padding,
            gap:           cfg.gap,
            icon_size:     cfg.icon_size,
        }
    }

    /// Background of a panel card, slightly lifted from the sidebar itself.
    pub fn panel_background(&self) -> Color {
        self.foreground.with_alpha(0.06)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
