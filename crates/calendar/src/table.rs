use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use sidebar_core::{CalendarEvent, Result, SidebarError};

/// One row of an ical adapter table state.
///
/// The adapter publishes its upcoming events as a JSON array of these rows;
/// only the underscore-prefixed machine fields are used, the human-readable
/// `date` column is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IcalRow {
    #[serde(default)]
    pub event: String,
    #[serde(rename = "_date", default)]
    pub start: Option<Value>,
    #[serde(rename = "_end", default)]
    pub end: Option<Value>,
    #[serde(rename = "_allDay", default)]
    pub all_day: bool,
    #[serde(rename = "_calName", default)]
    pub calendar: Option<String>,
}

impl IcalRow {
    fn into_event(self, source_name: &str, color: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            summary:  self.event.trim().to_string(),
            start:    self.start.as_ref().and_then(parse_timestamp),
            end:      self.end.as_ref().and_then(parse_timestamp),
            all_day:  self.all_day,
            calendar: self
                .calendar
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| source_name.to_string()),
            color:    color.map(str::to_string),
        }
    }
}

/// Parse the value of an ical table state into events.
///
/// The backend stores the table either as a JSON array or as a string
/// holding the serialized array.
pub fn parse_table(value: &Value, source_name: &str, color: Option<&str>) -> Result<Vec<CalendarEvent>> {
    let rows: Vec<IcalRow> = match value {
        Value::String(raw) if raw.trim().is_empty() => Vec::new(),
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| SidebarError::Calendar(format!("{source_name}: {e}")))?,
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|e| SidebarError::Calendar(format!("{source_name}: {e}")))?,
        other => {
            return Err(SidebarError::Calendar(format!(
                "{source_name}: expected an event table, got {other}"
            )))
        }
    };

    Ok(rows
        .into_iter()
        .map(|row| row.into_event(source_name, color))
        .collect())
}

/// Parse a row timestamp.
///
/// Accepted forms: RFC 3339 (`2024-06-10T08:00:00.000Z`), local date-time
/// without offset, bare date (local midnight), and epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Local>> {
    match value {
        Value::Number(n) => {
            let ms = n.as_i64()?;
            DateTime::from_timestamp_millis(ms).map(|t| t.with_timezone(&Local))
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.with_timezone(&Local));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Local.from_local_datetime(&naive).earliest();
            }
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
        }
        _ => None,
    }
}
