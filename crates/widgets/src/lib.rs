pub mod calendar;
pub mod dates;
pub mod icons;
pub mod markup;
pub mod trash;
pub mod weather;

pub use calendar::{CalendarPanel, CalendarSettings, CalendarWidget, RefreshRequest};
pub use markup::Markup;
pub use trash::{TrashKeys, TrashPanel};
pub use weather::{WeatherKeys, WeatherReadout, WeatherWidget};
