//! VEVENT extraction on top of the icalendar crate's parser.

use chrono_tz::Tz;
use icalendar::DatePerhapsTime;
use icalendar::parser::{Component, read_calendar, unfold};

use crate::error::{SyncError, SyncResult};
use crate::ics::event::RawEvent;
use crate::ics::time::to_target_time;

/// Read every VEVENT in `source`, converting timestamps into `timezone`.
///
/// Events are returned in file order, including ones without a UID; callers
/// decide what to drop. A file the parser cannot read at all is an error;
/// a blank one holds no events.
pub fn read_events(source: &str, timezone: Tz) -> SyncResult<Vec<RawEvent>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let unfolded = unfold(source);
    let calendar = read_calendar(&unfolded).map_err(SyncError::Calendar)?;

    Ok(calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(|vevent| to_raw_event(vevent, timezone))
        .collect())
}

/// Only the VEVENT's own properties are read; VALARM and other
/// sub-components live in `vevent.components`.
fn to_raw_event(vevent: &Component<'_>, timezone: Tz) -> RawEvent {
    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| p.val.to_string().trim().to_string())
            .unwrap_or_default()
    };
    let time = |name: &str| {
        vevent
            .find_prop(name)
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .and_then(|dpt| to_target_time(dpt, timezone))
    };

    RawEvent {
        uid: text("UID"),
        summary: text("SUMMARY"),
        location: text("LOCATION"),
        description: vevent
            .find_prop("DESCRIPTION")
            .map(|p| p.val.to_string())
            .unwrap_or_default(),
        start: time("DTSTART"),
        end: time("DTEND"),
    }
}
