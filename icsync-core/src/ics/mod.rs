//! Reading VEVENT records out of calendar source text.

mod event;
mod parse;
mod time;

pub use event::RawEvent;
pub use parse::read_events;
pub use time::to_target_time;
