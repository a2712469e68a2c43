use crate::markup::Markup;
use iced::{
    widget::{button, column, text},
    Element,
};
use serde_json::Value;
use sidebar_config::CalendarConfig;
use sidebar_core::{
    event::Message,
    state::{as_text, is_truthy, read_value, CommandSink, StateStore},
};
use sidebar_theme::Theme;

pub const TRASH_PLACEHOLDER: &str = "Keine Müll-Informationen verfügbar.";
pub const TRASH_BUTTON_LABEL: &str = "Tonne draußen";

/// State ids used by the bin schedule sub-panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashKeys {
    /// Pre-rendered schedule HTML.
    pub html_state_id:   String,
    /// Boolean "bin is out" flag.  Empty = no toggle button.
    pub button_state_id: String,
}

impl TrashKeys {
    pub fn from_config(cfg: &CalendarConfig) -> Self {
        Self {
            html_state_id:   cfg.trash_html_state_id.trim().to_string(),
            button_state_id: cfg.trash_button_state_id.trim().to_string(),
        }
    }
}

/// Bin schedule shown below the calendar events, plus the "bin out" toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashPanel {
    pub content:     Markup,
    pub show_button: bool,
}

impl TrashPanel {
    /// Snapshot the schedule from the state store.
    pub fn read<S: StateStore + ?Sized>(store: &S, keys: &TrashKeys) -> Self {
        let content = read_value(store, &keys.html_state_id)
            .filter(is_truthy)
            .map(|v| Markup::Html(as_text(&v)))
            .unwrap_or_else(|| Markup::Text(TRASH_PLACEHOLDER.to_string()));

        Self {
            content,
            show_button: !keys.button_state_id.is_empty(),
        }
    }

    pub fn view<'a>(&'a self, theme: &'a Theme, alpha: f32) -> Element<'a, Message> {
        let fg = theme.foreground.with_alpha(alpha);
        let schedule = text(self.content.display_text())
            .size(theme.font_size - 1.0)
            .color(fg.to_iced());

        if !self.show_button {
            return column![schedule].into();
        }

        let toggle = button(
            text(TRASH_BUTTON_LABEL)
                .size(theme.font_size - 1.0)
                .color(theme.accent.with_alpha(alpha).to_iced()),
        )
        .on_press(Message::TrashToggle)
        .padding([4, 10])
        .style(button::secondary);

        column![schedule, toggle].spacing(theme.gap as f32).into()
    }
}

/// Flip the "bin out" flag through the command sink.
///
/// Nothing changes locally; the new value shows up once the backend's
/// snapshot is reloaded.  Without a sink the click is dropped.  Returns the
/// value that was sent.
pub fn toggle<S: StateStore + ?Sized>(
    store: &S,
    sink: Option<&dyn CommandSink>,
    keys: &TrashKeys,
) -> Option<bool> {
    let sink = sink?;
    if keys.button_state_id.is_empty() {
        return None;
    }

    let current = read_value(store, &keys.button_state_id).is_some_and(|v| is_truthy(&v));
    let next = !current;
    sink.send_command(&keys.button_state_id, Value::Bool(next));
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sidebar_core::{StateSnapshot, StateValue};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, StateValue)>>);

    impl CommandSink for Recorder {
        fn send_command(&self, key: &str, value: StateValue) {
            self.0.lock().unwrap().push((key.to_string(), value));
        }
    }

    fn keys() -> TrashKeys {
        TrashKeys::from_config(&CalendarConfig::default())
    }

    #[test]
    fn html_is_kept_verbatim() {
        let store = StateSnapshot::new();
        store.set(keys().html_state_id, "<b>Bio</b> morgen");

        let panel = TrashPanel::read(&store, &keys());
        assert_eq!(panel.content, Markup::Html("<b>Bio</b> morgen".into()));
        assert!(panel.show_button);
    }

    #[test]
    fn empty_or_missing_html_shows_placeholder() {
        let store = StateSnapshot::new();
        let placeholder = Markup::Text(TRASH_PLACEHOLDER.into());
        assert_eq!(TrashPanel::read(&store, &keys()).content, placeholder);

        store.set(keys().html_state_id, "");
        assert_eq!(TrashPanel::read(&store, &keys()).content, placeholder);
    }

    #[test]
    fn toggle_inverts_current_value_without_touching_the_store() {
        let store = StateSnapshot::new();
        let sink = Recorder::default();
        let k = keys();

        assert_eq!(toggle(&store, Some(&sink), &k), Some(true));

        store.set(k.button_state_id.clone(), true);
        assert_eq!(toggle(&store, Some(&sink), &k), Some(false));
        assert_eq!(read_value(&store, &k.button_state_id), Some(json!(true)));

        let sent = sink.0.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                (k.button_state_id.clone(), json!(true)),
                (k.button_state_id.clone(), json!(false)),
            ]
        );
    }

    #[test]
    fn toggle_without_sink_is_a_no_op() {
        let store = StateSnapshot::new();
        assert_eq!(toggle(&store, None, &keys()), None);
    }
}
