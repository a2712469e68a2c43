use chrono::{DateTime, Local};

/// A single calendar entry as delivered by the calendar backend.
///
/// Either timestamp may be missing when the backend row could not be parsed;
/// such events are still listed but never get a past/now/future status.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary:  String,
    pub start:    Option<DateTime<Local>>,
    pub end:      Option<DateTime<Local>>,
    pub all_day:  bool,
    /// Display name of the calendar this event came from.
    pub calendar: String,
    /// Optional accent colour of the source calendar (hex).
    pub color:    Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn events_compare_by_value() {
        let start = Local.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).earliest();
        let event = CalendarEvent {
            summary:  "Zahnarzt".into(),
            start,
            end:      None,
            all_day:  false,
            calendar: "Familie".into(),
            color:    Some("#89b4fa".into()),
        };

        let mut moved = event.clone();
        assert_eq!(moved, event);
        moved.end = start;
        assert_ne!(moved, event);
    }
}
