//! Attendance business rules.
//!
//! Two wall-clock rules drive everything here:
//! - a check-in at or after the late threshold (08:01 by default) is late;
//! - sick and unpaid leave default to a fixed local window (08:00-17:00).
//!
//! All functions are pure. The acting timezone and the current instant are
//! passed in through [`RuleContext`] rather than read from the environment.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::attendance_type::{AttendanceType, ColorCode};
use crate::timezone::{local_date, local_time, localize};
use crate::types::ValidationError;

/// Per-invocation context for rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// The acting user's timezone.
    pub tz: Tz,
    /// The current instant, used when a leave day has no check-in to anchor it.
    pub now: DateTime<Utc>,
}

impl RuleContext {
    pub const fn new(tz: Tz, now: DateTime<Utc>) -> Self {
        Self { tz, now }
    }

    /// Today's calendar date in the acting timezone.
    pub fn today(&self) -> NaiveDate {
        local_date(self.now, self.tz)
    }
}

/// Wall-clock thresholds used by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Check-ins at or after this local time are late.
    #[serde(with = "time_of_day")]
    pub late_threshold: NaiveTime,
    /// Local start of a synthesized leave day.
    #[serde(with = "time_of_day")]
    pub leave_start: NaiveTime,
    /// Local end of a synthesized leave day.
    #[serde(with = "time_of_day")]
    pub leave_end: NaiveTime,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            late_threshold: hm(8, 1),
            leave_start: hm(8, 0),
            leave_end: hm(17, 0),
        }
    }
}

impl RuleConfig {
    /// Checks that the leave window is a non-empty range within one day.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.leave_start >= self.leave_end {
            return Err(ValidationError::InvalidLeaveWindow {
                start: format_time_of_day(self.leave_start),
                end: format_time_of_day(self.leave_end),
            });
        }
        Ok(())
    }
}

/// A synthesized check-in/check-out pair for a day of leave, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveWindow {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

/// Applies the attendance rules for a fixed [`RuleConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleEngine {
    config: RuleConfig,
}

impl RuleEngine {
    /// Creates an engine after validating the configuration.
    pub fn new(config: RuleConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Classifies a local check-in time as present or late.
    ///
    /// Never yields sick or unpaid; those are only ever assigned explicitly.
    pub fn classify_local_time(&self, check_in_local: NaiveTime) -> AttendanceType {
        if check_in_local >= self.config.late_threshold {
            AttendanceType::Late
        } else {
            AttendanceType::Present
        }
    }

    /// Classifies a UTC check-in using its wall-clock time in `tz`.
    pub fn classify_check_in(&self, check_in: DateTime<Utc>, tz: Tz) -> AttendanceType {
        self.classify_local_time(local_time(check_in, tz))
    }

    /// The local date a leave window is anchored to: the check-in's date if
    /// there is one, otherwise today.
    pub fn leave_reference_date(check_in: Option<DateTime<Utc>>, ctx: &RuleContext) -> NaiveDate {
        check_in.map_or_else(|| ctx.today(), |instant| local_date(instant, ctx.tz))
    }

    /// Builds the leave window for `date` in `tz`, converted to UTC.
    ///
    /// Deterministic in its inputs, so repeated calls give the same instants.
    pub fn synthesize_leave_window(&self, date: NaiveDate, tz: Tz) -> LeaveWindow {
        LeaveWindow {
            check_in: localize(date, self.config.leave_start, tz),
            check_out: localize(date, self.config.leave_end, tz),
        }
    }
}

/// Span between check-in and check-out that counts as work, if any.
///
/// Leave types never count. An inverted pair yields a negative duration.
fn worked_duration(
    attendance_type: AttendanceType,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) -> Option<Duration> {
    if attendance_type.is_leave() {
        return None;
    }
    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => Some(check_out - check_in),
        _ => None,
    }
}

/// Worked hours for a record's fields.
///
/// Zero for sick/unpaid leave and for records missing either timestamp.
/// Inverted pairs are not clamped and produce negative hours.
#[allow(clippy::cast_precision_loss)]
pub fn compute_worked_hours(
    attendance_type: AttendanceType,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) -> f64 {
    worked_duration(attendance_type, check_in, check_out)
        .map_or(0.0, |duration| duration.num_milliseconds() as f64 / 3_600_000.0)
}

/// Calendar color for a type.
pub const fn compute_color(attendance_type: AttendanceType) -> ColorCode {
    attendance_type.color()
}

/// Human-readable summary of a record in `tz`.
///
/// Leave records show the type name. Other records show worked time and the
/// local check-in/check-out, e.g. `8h 30m(09:00 - 17:30)`, or `0h 0m` before
/// anyone has checked in.
pub fn compute_display_label(
    attendance_type: AttendanceType,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    tz: Tz,
) -> String {
    if attendance_type.is_leave() {
        return attendance_type.label().to_string();
    }
    let Some(check_in_at) = check_in else {
        return "0h 0m".to_string();
    };

    let total_minutes = worked_duration(attendance_type, check_in, check_out)
        .map_or(0, |duration| duration.num_minutes());
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    let check_in_str = local_time(check_in_at, tz).format("%H:%M").to_string();
    let check_out_str = check_out
        .map(|instant| local_time(instant, tz).format("%H:%M").to_string())
        .unwrap_or_default();

    format!("{hours}h {minutes}m({check_in_str} - {check_out_str})")
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTimeOfDay {
            value: value.to_string(),
        })
}

/// Formats a time of day as `HH:MM`, keeping seconds only when set.
pub fn format_time_of_day(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Serde adapter for `HH:MM` times of day.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time_of_day(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_time_of_day(&s).map_err(serde::de::Error::custom)
    }
}
