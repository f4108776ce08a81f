use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use icalendar::{CalendarDateTime, DatePerhapsTime};

/// Convert a parsed DTSTART/DTEND into the target timezone.
///
/// - Date: midnight in `timezone`
/// - UTC: converted
/// - Floating: taken as local time in `timezone`
/// - With TZID: local time in that zone, falling back to `timezone` when the
///   TZID is not an IANA name
pub fn to_target_time(value: DatePerhapsTime, timezone: Tz) -> Option<DateTime<Tz>> {
    match value {
        DatePerhapsTime::Date(date) => timezone
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest(),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt.with_timezone(&timezone)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            timezone.from_local_datetime(&naive).earliest()
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zone = tzid.parse::<Tz>().unwrap_or_else(|_| {
                tracing::debug!(%tzid, "unknown TZID, using target timezone");
                timezone
            });
            zone.from_local_datetime(&date_time)
                .earliest()
                .map(|dt| dt.with_timezone(&timezone))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
    use chrono_tz::Asia::Tokyo;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_utc_is_converted_to_target_zone() {
        let utc = Utc.with_ymd_and_hms(2025, 4, 5, 1, 0, 0).unwrap();
        let dt = to_target_time(DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)), Tokyo).unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.to_rfc3339(), "2025-04-05T10:00:00+09:00");
    }

    #[test]
    fn test_floating_time_is_taken_as_target_zone() {
        let value = DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive(2025, 4, 5, 14, 30)));
        let dt = to_target_time(value, Tokyo).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-05T14:30:00+09:00");
    }

    #[test]
    fn test_tzid_is_honored() {
        let value = DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
            date_time: naive(2025, 4, 5, 9, 0),
            tzid: "Europe/London".to_string(),
        });
        // 09:00 BST == 08:00 UTC == 17:00 JST
        assert_eq!(to_target_time(value, Tokyo).unwrap().to_rfc3339(), "2025-04-05T17:00:00+09:00");
    }

    #[test]
    fn test_unknown_tzid_falls_back_to_target_zone() {
        let value = DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
            date_time: naive(2025, 4, 5, 9, 0),
            tzid: "Tokyo Standard Time".to_string(),
        });
        assert_eq!(to_target_time(value, Tokyo).unwrap().to_rfc3339(), "2025-04-05T09:00:00+09:00");
    }

    #[test]
    fn test_date_only_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        let dt = to_target_time(DatePerhapsTime::Date(date), Tokyo).unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (5, 0, 0));
    }
}
