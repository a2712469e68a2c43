pub mod provider;
pub mod table;

pub use provider::{events_on, CalendarProvider, IcalStateProvider, RawCalendarData};
pub use table::{parse_table, parse_timestamp, IcalRow};
