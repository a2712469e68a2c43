//! Wayland layer-shell surface for `sidebar`.
//!
//! Owns the Iced application loop and wires together all background tasks:
//! - Calendar refresh and status tickers
//! - Weather ticker
//! - State snapshot watcher (reload on change)
//! - Config file watcher (live reload on change)
//! - Frame clock while the calendar slides in

use futures::channel::mpsc::Sender;
use iced::{
    widget::{column, container, scrollable, Column},
    Element, Length, Subscription, Task,
};
use iced_layershell::{
    build_pattern::application,
    reexport::{Anchor, Layer},
    settings::{LayerShellSettings, Settings},
    to_layer_message,
};
use sidebar_calendar::IcalStateProvider;
use sidebar_config::{
    default_path, load as load_config, states_path, FileWatcher, Position, SidebarConfig,
};
use sidebar_core::{
    event::Message as AppMessage,
    schedule::{spawn_ticker, CALENDAR_REFRESH, CALENDAR_STATUS, WEATHER_REFRESH},
    state::StateStore,
};
use sidebar_states::FileStateStore;
use sidebar_theme::Theme;
use sidebar_widgets::{
    CalendarSettings, CalendarWidget, RefreshRequest, WeatherKeys, WeatherWidget,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Redraw interval while an animation runs.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ── Entry point ───────────────────────────────────────────────────────────────

/// Start the sidebar.  Never returns under normal operation.
pub fn run() -> iced_layershell::Result {
    let config = load_config(default_path()).unwrap_or_default();
    let width = config.global.width;
    let exclusive_zone = if config.global.exclusive_zone {
        width as i32
    } else {
        0
    };

    application(Sidebar::new, Sidebar::namespace, Sidebar::update, Sidebar::view)
        .subscription(Sidebar::subscription)
        .style(Sidebar::style)
        .settings(Settings {
            layer_settings: LayerShellSettings {
                size: Some((width, 0)), // height=0 + T|B anchor = full-height stretch
                exclusive_zone,
                anchor: position_to_anchor(config.global.position),
                layer: Layer::Top,
                ..Default::default()
            },
            ..Default::default()
        })
        .run()
}

// ── Message ───────────────────────────────────────────────────────────────────

/// Top-level application messages.
///
/// `#[to_layer_message]` injects layer-shell control variants (AnchorChange,
/// SizeChange, etc.).  Those are handled by the backend and never reach
/// `update()`.
#[to_layer_message]
#[derive(Debug, Clone)]
pub enum Message {
    /// Propagate a core event-bus message.
    App(AppMessage),
    /// Animation frame.
    Frame,
}

// ── State ─────────────────────────────────────────────────────────────────────

struct Sidebar {
    config:   SidebarConfig,
    theme:    Theme,
    store:    FileStateStore,
    calendar: CalendarWidget,
    weather:  WeatherWidget,
    /// Clock the view animates against; advanced by `Frame`.
    now:      Instant,
}

impl Sidebar {
    fn new() -> (Self, Task<Message>) {
        let config = load_config(default_path()).unwrap_or_default();
        let theme = Theme::from_config(&config.theme);
        let store = FileStateStore::open(states_path(&config));
        info!("States from '{}'", store.path().display());

        let snapshot: Arc<dyn StateStore> = Arc::new(store.snapshot());
        let calendar = CalendarWidget::new(
            CalendarSettings::from_config(&config.calendar),
            Arc::new(IcalStateProvider::new(snapshot)),
        );
        let weather = WeatherWidget::new(WeatherKeys::from_config(&config.weather));

        let sidebar = Self {
            config,
            theme,
            store,
            calendar,
            weather,
            now: Instant::now(),
        };

        // The tickers fire immediately, so the first fetch comes from there.
        (sidebar, Task::none())
    }

    fn namespace() -> String {
        String::from("sidebar")
    }

    // ── Update ────────────────────────────────────────────────────────────────

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Frame => {
                self.now = Instant::now();
                Task::none()
            }
            Message::App(msg) => self.handle_app(msg),
            // Layer-shell injected variants are handled by the backend.
            _ => Task::none(),
        }
    }

    fn handle_app(&mut self, msg: AppMessage) -> Task<Message> {
        match msg {
            AppMessage::CalendarRefresh => return fetch(self.calendar.refresh()),
            AppMessage::CalendarNavigate(nav) => {
                if let Some(request) = self.calendar.navigate(nav) {
                    return fetch(request);
                }
            }
            AppMessage::CalendarLoaded { generation, result } => {
                if self.calendar.apply(generation, result, &self.store) {
                    self.now = Instant::now();
                }
            }
            AppMessage::CalendarStatusTick => {
                self.calendar.update_event_status();
                // First tick after midnight: heading and control are outdated.
                if self.calendar.is_stale() {
                    return fetch(self.calendar.refresh());
                }
            }
            AppMessage::TrashToggle => self.calendar.toggle_trash(&self.store, Some(&self.store)),
            AppMessage::WeatherTick => self.weather.refresh(&self.store),
            AppMessage::StatesReloaded => match self.store.reload() {
                Ok(count) => {
                    debug!("States reloaded ({count} entries)");
                    self.calendar.reload_trash(&self.store);
                }
                Err(e) => warn!("States reload failed: {e}"),
            },
            AppMessage::ConfigReloaded => match load_config(default_path()) {
                Ok(cfg) => {
                    info!("Config reloaded");
                    self.theme = Theme::from_config(&cfg.theme);
                    self.config = cfg;
                }
                Err(e) => warn!("Config reload failed: {e}"),
            },
        }
        Task::none()
    }

    // ── View ──────────────────────────────────────────────────────────────────

    fn view(&self) -> Element<'_, Message> {
        let mut panels = Column::new().spacing(self.theme.gap as f32 * 2.0);

        if self.config.weather.enabled {
            panels = panels.push(self.weather.view(&self.theme).map(Message::App));
        }
        if self.config.calendar.enabled {
            if let Some(calendar) = self.calendar.view(&self.theme, self.now) {
                panels = panels.push(calendar.map(Message::App));
            }
        }

        container(scrollable(column![panels].padding(self.theme.padding)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    fn subscription(&self) -> Subscription<Message> {
        let mut subs = vec![
            Subscription::run(config_stream),
            Subscription::run_with(self.store.path().to_path_buf(), states_stream),
        ];

        if self.config.calendar.enabled {
            subs.push(Subscription::run(calendar_refresh_stream));
            subs.push(Subscription::run(calendar_status_stream));
        }
        if self.config.weather.enabled {
            subs.push(Subscription::run(weather_stream));
        }
        if self.calendar.is_animating(self.now) {
            subs.push(iced::time::every(FRAME_INTERVAL).map(|_| Message::Frame));
        }

        Subscription::batch(subs)
    }

    // ── Style ─────────────────────────────────────────────────────────────────

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        let bg = self.theme.background.with_alpha(self.config.global.opacity);
        iced::theme::Style {
            background_color: bg.to_iced(),
            text_color: self.theme.foreground.to_iced(),
        }
    }
}

/// Run a calendar fetch off the UI thread and report back with its generation.
fn fetch(request: RefreshRequest) -> Task<Message> {
    let RefreshRequest { generation, fetch } = request;
    Task::perform(fetch, move |result| {
        Message::App(AppMessage::CalendarLoaded {
            generation,
            result: result.map_err(|e| e.to_string()),
        })
    })
}

// ── Subscription streams ──────────────────────────────────────────────────────
//
// Each free function acts as both the stream builder AND the unique identity
// key for `Subscription::run(fn_ptr)`.  Iced uses the function pointer address
// to deduplicate subscriptions across redraws, so a stream stops (and its
// ticker is dropped) exactly when its widget is disabled.

fn ticker_stream(
    period: Duration,
    immediate: bool,
    msg: AppMessage,
) -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(1, move |mut sender: Sender<Message>| async move {
        let mut ticker = spawn_ticker(period, immediate);

        while ticker.tick().await.is_some() {
            let _ = sender.try_send(Message::App(msg.clone()));
        }

        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

/// Full calendar re-fetch on start, then every [`CALENDAR_REFRESH`].
fn calendar_refresh_stream() -> impl iced::futures::Stream<Item = Message> {
    ticker_stream(CALENDAR_REFRESH, true, AppMessage::CalendarRefresh)
}

/// Past / now / future reclassification every [`CALENDAR_STATUS`].
fn calendar_status_stream() -> impl iced::futures::Stream<Item = Message> {
    ticker_stream(CALENDAR_STATUS, false, AppMessage::CalendarStatusTick)
}

/// Weather re-read on start, then every [`WEATHER_REFRESH`].
fn weather_stream() -> impl iced::futures::Stream<Item = Message> {
    ticker_stream(WEATHER_REFRESH, true, AppMessage::WeatherTick)
}

/// Watches the state snapshot file and sends `StatesReloaded`.
fn states_stream(path: &PathBuf) -> impl iced::futures::Stream<Item = Message> {
    let path = path.clone();
    iced::stream::channel(1, move |mut sender: Sender<Message>| async move {
        let (_watcher, mut rx) = FileWatcher::spawn(&path);

        while rx.recv().await.is_some() {
            let _ = sender.try_send(Message::App(AppMessage::StatesReloaded));
        }

        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

/// Watches `~/.config/sidebar/sidebar.toml` for writes and sends `ConfigReloaded`.
fn config_stream() -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(1, |mut sender: Sender<Message>| async move {
        let (_watcher, mut rx) = FileWatcher::spawn(default_path());

        while rx.recv().await.is_some() {
            let _ = sender.try_send(Message::App(AppMessage::ConfigReloaded));
        }

        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn position_to_anchor(pos: Position) -> Anchor {
    match pos {
        Position::Left  => Anchor::Top | Anchor::Bottom | Anchor::Left,
        Position::Right => Anchor::Top | Anchor::Bottom | Anchor::Right,
    }
}
