use crate::calendar::CalendarEvent;

/// Direction of the calendar's day navigation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    /// Today → tomorrow.
    Next,
    /// Tomorrow → today.
    Prev,
}

/// All messages (events) that can flow through the application event bus.
///
/// Sources:
/// - Poll tickers          → `CalendarRefresh`, `CalendarStatusTick`, `WeatherTick`
/// - Calendar fetch task   → `CalendarLoaded`
/// - File watchers         → `StatesReloaded`, `ConfigReloaded`
/// - User input            → `CalendarNavigate`, `TrashToggle`
#[derive(Debug, Clone)]
pub enum Message {
    // ── Calendar ──────────────────────────────────────────────────────────────
    /// Full re-fetch of calendar data (on start, then every 3 hours).
    CalendarRefresh,
    /// Reclassify rendered events as past / now / future (every minute).
    CalendarStatusTick,
    /// A calendar fetch finished.  `generation` identifies the request so
    /// stale responses can be dropped.
    CalendarLoaded {
        generation: u64,
        result:     Result<Vec<CalendarEvent>, String>,
    },
    /// User clicked the day navigation control.
    CalendarNavigate(Nav),
    /// User clicked the "bin out" toggle.
    TrashToggle,

    // ── Weather ───────────────────────────────────────────────────────────────
    /// Re-read the weather states (on start, then every 60 seconds).
    WeatherTick,

    // ── Files ─────────────────────────────────────────────────────────────────
    /// The state snapshot file changed on disk.
    StatesReloaded,
    /// Config file changed on disk; triggers a live reload.
    ConfigReloaded,
}
