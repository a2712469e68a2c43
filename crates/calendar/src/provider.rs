use crate::table::parse_table;
use chrono::{DateTime, Local, NaiveDate};
use futures::future::{BoxFuture, FutureExt};
use sidebar_config::CalendarSourceConfig;
use sidebar_core::{
    state::{read_value, StateStore},
    CalendarEvent, Result,
};
use std::sync::Arc;
use tracing::debug;

/// Events of all configured calendars, unfiltered.
pub type RawCalendarData = Vec<CalendarEvent>;

/// Source of calendar data for the calendar panel.
pub trait CalendarProvider: Send + Sync {
    /// Load the events of every source.  May fail; callers keep their
    /// previous rendering in that case.
    fn fetch(&self, sources: &[CalendarSourceConfig]) -> BoxFuture<'static, Result<RawCalendarData>>;

    /// Events that touch `date`, in display order.
    fn filter_for_date(&self, data: &RawCalendarData, date: NaiveDate) -> Vec<CalendarEvent> {
        events_on(data, date)
    }
}

/// Reads ical adapter tables out of the state store.
#[derive(Clone)]
pub struct IcalStateProvider {
    store: Arc<dyn StateStore>,
}

impl IcalStateProvider {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for IcalStateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcalStateProvider").finish_non_exhaustive()
    }
}

impl CalendarProvider for IcalStateProvider {
    fn fetch(&self, sources: &[CalendarSourceConfig]) -> BoxFuture<'static, Result<RawCalendarData>> {
        let store = Arc::clone(&self.store);
        let sources = sources.to_vec();

        async move {
            let mut events = Vec::new();
            for source in &sources {
                // A source without a table simply has no events yet.
                let Some(table) = read_value(store.as_ref(), &source.state_id) else {
                    debug!("Calendar '{}': no data in '{}'", source.name, source.state_id);
                    continue;
                };
                events.extend(parse_table(&table, &source.name, source.color.as_deref())?);
            }
            Ok(events)
        }
        .boxed()
    }
}

/// Events overlapping the local day `date`, all-day events first, then by
/// start time.
///
/// An event without an end counts for the day its start falls on; events
/// without a start cannot be placed and are dropped.
pub fn events_on(data: &[CalendarEvent], date: NaiveDate) -> Vec<CalendarEvent> {
    let (Some(day_start), Some(day_end)) = (
        local_midnight(date),
        date.succ_opt().and_then(local_midnight),
    ) else {
        return Vec::new();
    };

    let mut events: Vec<CalendarEvent> = data
        .iter()
        .filter(|e| match (e.start, e.end) {
            (Some(start), Some(end)) => {
                (start < day_end && end > day_start) || (start >= day_start && start < day_end)
            }
            (Some(start), None) => start >= day_start && start < day_end,
            (None, _) => false,
        })
        .cloned()
        .collect();

    events.sort_by_key(|e| (!e.all_day, e.start));
    events
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use sidebar_core::StateSnapshot;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<DateTime<Local>> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest()
    }

    fn event(summary: &str, start: Option<DateTime<Local>>, end: Option<DateTime<Local>>) -> CalendarEvent {
        CalendarEvent {
            summary: summary.to_string(),
            start,
            end,
            all_day: false,
            calendar: "test".to_string(),
            color: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keeps_overlapping_events_only() {
        let data = vec![
            event("yesterday", at(2024, 6, 9, 10, 0), at(2024, 6, 9, 11, 0)),
            event("overnight", at(2024, 6, 9, 22, 0), at(2024, 6, 10, 2, 0)),
            event("lunch", at(2024, 6, 10, 12, 0), at(2024, 6, 10, 13, 0)),
            event("ends at midnight", at(2024, 6, 9, 20, 0), at(2024, 6, 10, 0, 0)),
            event("open end", at(2024, 6, 10, 18, 0), None),
            event("no start", None, at(2024, 6, 10, 9, 0)),
            event("tomorrow", at(2024, 6, 11, 0, 0), at(2024, 6, 11, 1, 0)),
        ];

        let names: Vec<_> = events_on(&data, day(2024, 6, 10))
            .into_iter()
            .map(|e| e.summary)
            .collect();
        assert_eq!(names, ["overnight", "lunch", "open end"]);
    }

    #[test]
    fn all_day_events_sort_first() {
        let mut holiday = event("holiday", at(2024, 6, 10, 0, 0), at(2024, 6, 11, 0, 0));
        holiday.all_day = true;
        let data = vec![event("early", at(2024, 6, 10, 7, 0), at(2024, 6, 10, 8, 0)), holiday];

        let names: Vec<_> = events_on(&data, day(2024, 6, 10))
            .into_iter()
            .map(|e| e.summary)
            .collect();
        assert_eq!(names, ["holiday", "early"]);
    }

    #[test]
    fn fetch_reads_every_source_and_skips_empty_ones() {
        let store = StateSnapshot::new();
        store.set(
            "ical.0.data.table",
            json!([{ "event": "Zahnarzt", "_date": "2024-06-10T10:00:00", "_end": "2024-06-10T11:00:00" }]),
        );
        let provider = IcalStateProvider::new(Arc::new(store));
        let sources = vec![
            CalendarSourceConfig::new("Familie", "ical.0.data.table"),
            CalendarSourceConfig::new("Arbeit", "ical.1.data.table"),
        ];

        let data = futures::executor::block_on(provider.fetch(&sources)).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].calendar, "Familie");
        assert_eq!(provider.filter_for_date(&data, day(2024, 6, 10)).len(), 1);
        assert!(provider.filter_for_date(&data, day(2024, 6, 11)).is_empty());
    }

    #[test]
    fn malformed_source_rejects_the_fetch() {
        let store = StateSnapshot::new();
        store.set("ical.0.data.table", json!("{ broken"));
        let provider = IcalStateProvider::new(Arc::new(store));

        let result = futures::executor::block_on(
            provider.fetch(&[CalendarSourceConfig::new("Familie", "ical.0.data.table")]),
        );
        assert!(result.is_err());
    }
}
