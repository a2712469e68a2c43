use crate::{
    dates::{classify, is_today_at, is_tomorrow_at, today, EventStatus},
    trash::{self, TrashKeys, TrashPanel},
};
use chrono::{DateTime, Local, NaiveDate};
use futures::future::BoxFuture;
use iced::{
    widget::{button, column, container, row, text, Column},
    Alignment, Background, Border, Element, Length, Padding,
};
use lilt::{Animated, Easing};
use sidebar_calendar::{CalendarProvider, RawCalendarData};
use sidebar_config::{CalendarConfig, CalendarSourceConfig};
use sidebar_core::{
    event::{Message, Nav},
    state::{CommandSink, StateStore},
    CalendarEvent, Result,
};
use sidebar_theme::{Color, Theme};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

pub const HEADING_TODAY: &str = "Heutige Termine";
pub const HEADING_TOMORROW: &str = "Morgige Termine";
pub const NO_EVENTS: &str = "Keine Termine";
pub const ALL_DAY: &str = "ganztägig";

/// Duration of the panel's slide-in, in milliseconds.
const SLIDE_IN_MS: f32 = 350.0;
/// Horizontal distance the panel slides in from (pixels).
const SLIDE_IN_OFFSET: f32 = 24.0;

/// Configuration captured when the widget is created.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub sources: Vec<CalendarSourceConfig>,
    pub trash:   TrashKeys,
}

impl CalendarSettings {
    pub fn from_config(cfg: &CalendarConfig) -> Self {
        Self {
            sources: cfg.calendars.clone(),
            trash:   TrashKeys::from_config(cfg),
        }
    }
}

/// One rendered event together with its current wall-clock status.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event:  CalendarEvent,
    /// `None` until classified, and forever for events lacking start or end.
    pub status: Option<EventStatus>,
}

impl EventRow {
    /// `"08:00 – 09:30"`, `"08:00"` or the all-day label.
    pub fn time_label(&self) -> String {
        if self.event.all_day {
            return ALL_DAY.to_string();
        }
        match (self.event.start, self.event.end) {
            (Some(s), Some(e)) => format!("{} – {}", s.format("%H:%M"), e.format("%H:%M")),
            (Some(s), None) => s.format("%H:%M").to_string(),
            _ => String::new(),
        }
    }
}

/// Everything the calendar panel shows for one day.
///
/// Built in one go after a successful fetch and swapped in as a whole, so a
/// failed fetch never leaves a half-updated panel behind.
pub struct CalendarPanel {
    pub date:     NaiveDate,
    /// "Today" at the time the panel was built; heading and control are
    /// only valid while this is still the current day.
    pub built_on: NaiveDate,
    pub heading:  &'static str,
    pub nav:      Option<Nav>,
    pub rows:     Vec<EventRow>,
    pub trash:    TrashPanel,
    entry:        Animated<bool, Instant>,
}

impl std::fmt::Debug for CalendarPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarPanel")
            .field("date", &self.date)
            .field("built_on", &self.built_on)
            .field("heading", &self.heading)
            .field("nav", &self.nav)
            .field("rows", &self.rows)
            .field("trash", &self.trash)
            .finish_non_exhaustive()
    }
}

impl CalendarPanel {
    pub fn build(date: NaiveDate, today: NaiveDate, events: Vec<CalendarEvent>, trash: TrashPanel) -> Self {
        let heading = if is_today_at(date, today) {
            HEADING_TODAY
        } else {
            HEADING_TOMORROW
        };
        let nav = if is_today_at(date, today) {
            Some(Nav::Next)
        } else if is_tomorrow_at(date, today) {
            Some(Nav::Prev)
        } else {
            None
        };

        let mut entry = Animated::new(false)
            .duration(SLIDE_IN_MS)
            .easing(Easing::EaseOut);
        entry.transition(true, Instant::now());

        Self {
            date,
            built_on: today,
            heading,
            nav,
            rows: events
                .into_iter()
                .map(|event| EventRow { event, status: None })
                .collect(),
            trash,
            entry,
        }
    }

    /// Reclassify every row against `now`.  Rows without both timestamps
    /// keep whatever status they had.
    pub fn update_event_status(&mut self, now: DateTime<Local>) {
        for row in &mut self.rows {
            if let (Some(start), Some(end)) = (row.event.start, row.event.end) {
                row.status = Some(classify(start, end, now));
            }
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.entry.in_progress(now)
    }

    fn view<'a>(&'a self, theme: &'a Theme, now: Instant) -> Element<'a, Message> {
        let alpha = self.entry.animate_bool(0.0, 1.0, now);
        let offset = self.entry.animate_bool(SLIDE_IN_OFFSET, 0.0, now);

        let heading = text(self.heading)
            .size(theme.font_size + 2.0)
            .color(theme.accent.with_alpha(alpha).to_iced());

        let header: Element<'a, Message> = match self.nav {
            Some(nav) => {
                let glyph = match nav {
                    Nav::Next => "▶",
                    Nav::Prev => "◀",
                };
                let control = button(text(glyph).size(theme.font_size).color(theme.accent.to_iced()))
                    .on_press(Message::CalendarNavigate(nav))
                    .padding([2, 6])
                    .style(button::text);
                let header = match nav {
                    Nav::Next => row![container(heading).width(Length::Fill), control],
                    Nav::Prev => row![control, container(heading).width(Length::Fill)],
                };
                header.spacing(theme.gap as f32).align_y(Alignment::Center).into()
            }
            None => heading.into(),
        };

        let events: Element<'a, Message> = if self.rows.is_empty() {
            text(NO_EVENTS)
                .size(theme.font_size - 1.0)
                .color(theme.muted.with_alpha(alpha).to_iced())
                .into()
        } else {
            Column::with_children(self.rows.iter().map(|r| view_event(r, theme, alpha)))
                .spacing(theme.gap as f32)
                .into()
        };

        let body = column![header, events, self.trash.view(theme, alpha)]
            .spacing(theme.gap as f32 * 2.0);

        let pad = f32::from(theme.padding);
        let panel_bg = theme.panel_background();
        let radius = theme.border_radius;
        container(body)
            .width(Length::Fill)
            .padding(Padding {
                top:    pad,
                right:  pad,
                bottom: pad,
                left:   pad + offset,
            })
            .style(move |_| container::Style {
                background: Some(Background::Color(panel_bg.with_alpha(panel_bg.a * alpha).to_iced())),
                border: Border {
                    radius: radius.into(),
                    ..Border::default()
                },
                ..container::Style::default()
            })
            .into()
    }
}

fn view_event<'a>(item: &'a EventRow, theme: &'a Theme, alpha: f32) -> Element<'a, Message> {
    let color = match item.status {
        Some(EventStatus::Past) => theme.muted,
        Some(EventStatus::Now) => theme.accent,
        Some(EventStatus::Future) | None => theme.foreground,
    }
    .with_alpha(alpha);

    let marker_color = item
        .event
        .color
        .as_deref()
        .and_then(Color::from_hex)
        .unwrap_or(theme.accent)
        .with_alpha(alpha);

    let size = theme.font_size - 1.0;
    row![
        text("●").size(size).color(marker_color.to_iced()),
        text(item.time_label()).size(size).color(color.to_iced()),
        text(item.event.summary.as_str()).size(size).color(color.to_iced()),
    ]
    .spacing(theme.gap as f32)
    .align_y(Alignment::Center)
    .into()
}

/// A pending calendar fetch.  Its result must be handed back to
/// [`CalendarWidget::apply`] together with `generation`.
pub struct RefreshRequest {
    pub generation: u64,
    pub fetch:      BoxFuture<'static, Result<RawCalendarData>>,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Day-switchable calendar panel (today ⇄ tomorrow) with the bin schedule
/// appended below the events.
///
/// The widget never performs I/O itself: [`refresh`](Self::refresh) and
/// [`navigate`](Self::navigate) hand out a fetch future, and the caller
/// feeds the outcome back through [`apply`](Self::apply).  Every request gets
/// a new generation number; only the newest one may replace the panel, so a
/// slow earlier fetch can never overwrite a later one.
pub struct CalendarWidget {
    current:    NaiveDate,
    settings:   CalendarSettings,
    provider:   Arc<dyn CalendarProvider>,
    panel:      Option<CalendarPanel>,
    generation: u64,
}

impl std::fmt::Debug for CalendarWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarWidget")
            .field("current", &self.current)
            .field("settings", &self.settings)
            .field("panel", &self.panel)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl CalendarWidget {
    pub fn new(settings: CalendarSettings, provider: Arc<dyn CalendarProvider>) -> Self {
        Self::starting_at(settings, provider, today())
    }

    /// Create a widget whose displayed day starts at `date`.
    pub fn starting_at(
        settings: CalendarSettings,
        provider: Arc<dyn CalendarProvider>,
        date: NaiveDate,
    ) -> Self {
        Self {
            current: date,
            settings,
            provider,
            panel: None,
            generation: 0,
        }
    }

    /// Day currently selected for display.
    pub fn current_date(&self) -> NaiveDate {
        self.current
    }

    /// The panel on screen, if any fetch succeeded yet.
    pub fn panel(&self) -> Option<&CalendarPanel> {
        self.panel.as_ref()
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    pub fn refresh(&mut self) -> RefreshRequest {
        self.refresh_at(today())
    }

    /// Start a fetch for the current day.
    ///
    /// If the clock passed midnight since the last refresh, the selected day
    /// may have fallen out of the today/tomorrow window; it snaps back to
    /// today.
    pub fn refresh_at(&mut self, today: NaiveDate) -> RefreshRequest {
        self.snap_to_window(today);
        self.generation += 1;
        RefreshRequest {
            generation: self.generation,
            fetch:      self.provider.fetch(&self.settings.sources),
        }
    }

    pub fn navigate(&mut self, nav: Nav) -> Option<RefreshRequest> {
        self.navigate_at(nav, today())
    }

    /// Move one day forward (from today) or back (from tomorrow) and start a
    /// fetch.  A direction that does not fit the current day is ignored, so
    /// repeated clicks on a not-yet-replaced control cannot leave the window.
    ///
    /// A control drawn before midnight keeps working: the selection is first
    /// moved back into the window, and if the direction no longer fits, the
    /// panel is rebuilt for the new day instead.
    pub fn navigate_at(&mut self, nav: Nav, today: NaiveDate) -> Option<RefreshRequest> {
        self.snap_to_window(today);
        let next = match nav {
            Nav::Next if is_today_at(self.current, today) => self.current.succ_opt(),
            Nav::Prev if is_tomorrow_at(self.current, today) => self.current.pred_opt(),
            _ => None,
        };

        match next {
            Some(date) => {
                self.current = date;
                Some(self.refresh_at(today))
            }
            None if self.is_stale_at(today) => Some(self.refresh_at(today)),
            None => {
                debug!("Ignoring {nav:?} on {}", self.current);
                None
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(today())
    }

    /// `true` if the panel on screen was built on an earlier day, so its
    /// heading and navigation control no longer match the clock.
    pub fn is_stale_at(&self, today: NaiveDate) -> bool {
        self.panel.as_ref().is_some_and(|p| p.built_on != today)
    }

    /// Keep the selection inside the today/tomorrow window.
    fn snap_to_window(&mut self, today: NaiveDate) {
        if !is_today_at(self.current, today) && !is_tomorrow_at(self.current, today) {
            debug!("Calendar day {} out of range; back to {today}", self.current);
            self.current = today;
        }
    }

    /// Apply the outcome of a fetch.  Returns `true` if the panel was replaced.
    pub fn apply<S: StateStore + ?Sized>(
        &mut self,
        generation: u64,
        result: std::result::Result<RawCalendarData, String>,
        store: &S,
    ) -> bool {
        self.apply_at(generation, result, store, today(), Local::now())
    }

    pub fn apply_at<S: StateStore + ?Sized>(
        &mut self,
        generation: u64,
        result: std::result::Result<RawCalendarData, String>,
        store: &S,
        today: NaiveDate,
        now: DateTime<Local>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale calendar response (generation {generation}, latest {})",
                self.generation
            );
            return false;
        }

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to load calendar data: {e}");
                return false;
            }
        };

        let events = self.provider.filter_for_date(&data, self.current);
        let trash = TrashPanel::read(store, &self.settings.trash);
        let mut panel = CalendarPanel::build(self.current, today, events, trash);
        panel.update_event_status(now);
        self.panel = Some(panel);
        true
    }

    pub fn update_event_status(&mut self) {
        self.update_event_status_at(Local::now());
    }

    pub fn update_event_status_at(&mut self, now: DateTime<Local>) {
        if let Some(panel) = self.panel.as_mut() {
            panel.update_event_status(now);
        }
    }

    /// Re-read the bin schedule without refetching calendar data.
    pub fn reload_trash<S: StateStore + ?Sized>(&mut self, store: &S) {
        if let Some(panel) = self.panel.as_mut() {
            panel.trash = TrashPanel::read(store, &self.settings.trash);
        }
    }

    pub fn toggle_trash<S: StateStore + ?Sized>(&self, store: &S, sink: Option<&dyn CommandSink>) {
        trash::toggle(store, sink, &self.settings.trash);
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.panel.as_ref().is_some_and(|p| p.is_animating(now))
    }

    /// Nothing is drawn until the first fetch succeeded.
    pub fn view<'a>(&'a self, theme: &'a Theme, now: Instant) -> Option<Element<'a, Message>> {
        self.panel.as_ref().map(|panel| panel.view(theme, now))
    }
}
