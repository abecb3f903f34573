//! Local UTC offset helpers.

use chrono::{FixedOffset, Local, Offset};

/// The host process's current UTC offset as `±HH:MM`.
pub fn system_timezone() -> String {
    let offset_secs = Local::now().offset().fix().local_minus_utc();
    format_offset(offset_secs)
}

/// Format an offset east of UTC, in seconds, as `±HH:MM`. Zero is `+00:00`.
pub fn format_offset(offset_secs: i32) -> String {
    let sign = if offset_secs >= 0 { '+' } else { '-' };
    let minutes = offset_secs.unsigned_abs() / 60;
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse `±HH:MM` (or `Z`) into a fixed offset.
pub fn parse_offset(timezone: &str) -> Option<FixedOffset> {
    let tz = timezone.trim();
    if tz.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
