pub mod calendar;
pub mod error;
pub mod event;
pub mod schedule;
pub mod state;

pub use calendar::CalendarEvent;
pub use error::{Result, SidebarError};
pub use event::{Message, Nav};
pub use state::{CommandSink, StateEntry, StateSnapshot, StateStore, StateValue};
