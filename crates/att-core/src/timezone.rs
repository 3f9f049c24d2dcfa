//! Timezone resolution and local/UTC conversion.
//!
//! Instants are always stored in UTC. Business rules (late threshold, leave
//! window) are expressed in the acting user's local wall-clock time, so every
//! rule converts through the helpers here.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolves an IANA zone name, falling back to UTC.
///
/// Absent or blank names resolve to UTC silently; names that fail to parse
/// resolve to UTC with a warning.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Tz::UTC;
    };
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(timezone = name, "unknown timezone, falling back to UTC");
        Tz::UTC
    })
}

/// Converts a local wall-clock time on `date` in `tz` to UTC.
///
/// Both edge cases read the wall time as standard time. Ambiguous times
/// (DST fall-back) resolve to the later, standard-time instant. Times inside a
/// DST gap are read with the offset in force before the gap, which lands the
/// same distance past the transition as the gap is long.
pub fn localize(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Wall-clock time of `instant` in `tz`.
pub fn local_time(instant: DateTime<Utc>, tz: Tz) -> NaiveTime {
    instant.with_timezone(&tz).time()
}
