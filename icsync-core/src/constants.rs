/// Input file used when neither `--ics-path` nor `ICS_PATH` is given.
pub const DEFAULT_ICS_PATH: &str = "soccer_osaka_hs_boys.ics";

/// IANA zone all timestamps are converted into.
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Assumed match length when DTEND is missing (status inference only).
pub const DEFAULT_EVENT_HOURS: i64 = 2;

/// Venue text marking a venue that has not been announced yet.
pub const VENUE_UNKNOWN_MARKER: &str = "会場不明";

/// Separator for fingerprint input. Never appears in calendar text.
pub const FINGERPRINT_SEPARATOR: &str = "\u{1f}";
