//! Core domain logic for attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: deciding present/late from the local check-in time
//! - Leave days: synthesizing the fixed check-in/check-out window for sick and unpaid leave
//! - Derived fields: worked hours, calendar color and display label
//! - Analytics: per-type and per-employee shares for the attendance chart

pub mod analytics;
pub mod attendance_type;
pub mod record;
pub mod rules;
pub mod timezone;
pub mod types;

pub use analytics::{AnalyticsReport, EmployeeShare, TypeBreakdown, summarize};
pub use attendance_type::{AttendanceType, ColorCode, UnknownAttendanceType};
pub use record::{AttendanceRecord, AttendanceUpdate, NewAttendance, UpdateOutcome};
pub use rules::{LeaveWindow, RuleConfig, RuleContext, RuleEngine};
pub use timezone::resolve_timezone;
pub use types::{AttendanceId, EmployeeId, ValidationError};

/// Re-exported so callers can name zones without depending on `chrono-tz` directly.
pub use chrono_tz::Tz;
