use chrono::DateTime;
use chrono_tz::Tz;

/// One VEVENT as read from the calendar, before any interpretation.
///
/// Text fields default to empty and timestamps to `None` when the property is
/// missing or unparseable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEvent {
    pub uid: String,
    pub summary: String,
    pub location: String,
    /// Description text after iCalendar un-escaping. May still contain
    /// literal `\n` sequences from double-escaping generators.
    pub description: String,
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
}

impl RawEvent {
    pub fn has_uid(&self) -> bool {
        !self.uid.is_empty()
    }
}
