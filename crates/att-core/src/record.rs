//! Attendance records and the create/update write path.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::attendance_type::{AttendanceType, ColorCode};
use crate::rules::{
    RuleContext, RuleEngine, compute_color, compute_display_label, compute_worked_hours,
};
use crate::types::{AttendanceId, EmployeeId};

/// One attendance entry with its derived fields.
///
/// `worked_hours` and `color` are stored alongside the record and must be
/// refreshed after any change to the timestamps or the type (see
/// [`AttendanceRecord::refresh_derived`]). The display label depends on the
/// viewer's timezone and is computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub employee_id: EmployeeId,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub attendance_type: AttendanceType,
    pub worked_hours: f64,
    pub color: ColorCode,
}

impl AttendanceRecord {
    /// Builds a record and computes its derived fields.
    pub fn new(
        id: AttendanceId,
        employee_id: EmployeeId,
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
        attendance_type: AttendanceType,
    ) -> Self {
        let mut record = Self {
            id,
            employee_id,
            check_in,
            check_out,
            attendance_type,
            worked_hours: 0.0,
            color: attendance_type.color(),
        };
        record.refresh_derived();
        record
    }

    /// Recomputes `worked_hours` and `color` from the current fields.
    pub fn refresh_derived(&mut self) {
        self.worked_hours =
            compute_worked_hours(self.attendance_type, self.check_in, self.check_out);
        self.color = compute_color(self.attendance_type);
    }

    /// Label for calendar views, rendered in `tz`.
    pub fn display_label(&self, tz: Tz) -> String {
        compute_display_label(self.attendance_type, self.check_in, self.check_out, tz)
    }
}

/// Input for creating a record. Any field except the employee may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_id: EmployeeId,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    /// `None` lets the engine classify from the check-in time.
    pub attendance_type: Option<AttendanceType>,
}

/// A partial edit of a record.
///
/// For the timestamps, `None` leaves the field untouched and `Some(None)`
/// clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceUpdate {
    pub check_in: Option<Option<DateTime<Utc>>>,
    pub check_out: Option<Option<DateTime<Utc>>>,
    pub attendance_type: Option<AttendanceType>,
}

impl AttendanceUpdate {
    pub const fn is_empty(&self) -> bool {
        self.check_in.is_none() && self.check_out.is_none() && self.attendance_type.is_none()
    }

    const fn touches_timestamps(&self) -> bool {
        self.check_in.is_some() || self.check_out.is_some()
    }
}

/// What the engine changed on its own while applying an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The new type when the engine toggled between present and late.
    pub reclassified: Option<AttendanceType>,
    /// Whether the leave window replaced both timestamps.
    pub leave_window_applied: bool,
}

impl RuleEngine {
    /// Builds a new record from partial input.
    ///
    /// Leave records get their missing timestamps from the leave window. A
    /// leave record without a check-in takes the whole window, so its
    /// timestamps always describe a single day.
    ///
    /// Records without an explicit type are classified from the check-in,
    /// or default to present when there is none.
    pub fn create(
        &self,
        id: AttendanceId,
        new: NewAttendance,
        ctx: &RuleContext,
    ) -> AttendanceRecord {
        let NewAttendance {
            employee_id,
            mut check_in,
            mut check_out,
            attendance_type,
        } = new;

        let attendance_type = match attendance_type {
            Some(kind) if kind.is_leave() => {
                match (check_in, check_out) {
                    (Some(_), Some(_)) => {}
                    (Some(_), None) => {
                        let date = Self::leave_reference_date(check_in, ctx);
                        let window = self.synthesize_leave_window(date, ctx.tz);
                        tracing::debug!(%id, %kind, %date, "filling leave check-out");
                        check_out = Some(window.check_out);
                    }
                    // Without a check-in the whole window is used, on the
                    // check-out's local date when there is one.
                    (None, anchor) => {
                        let date = Self::leave_reference_date(anchor, ctx);
                        let window = self.synthesize_leave_window(date, ctx.tz);
                        tracing::debug!(%id, %kind, %date, "applying leave window");
                        check_in = Some(window.check_in);
                        check_out = Some(window.check_out);
                    }
                }
                kind
            }
            Some(kind) => kind,
            None => check_in.map_or_else(AttendanceType::default, |instant| {
                self.classify_check_in(instant, ctx.tz)
            }),
        };

        AttendanceRecord::new(id, employee_id, check_in, check_out, attendance_type)
    }

    /// Applies `update` to `record` and recomputes derived fields.
    ///
    /// Switching to sick or unpaid replaces both timestamps with the leave
    /// window. Otherwise any timestamp edit re-evaluates present/late from the
    /// check-in, overriding an explicit present or late. Leave types are never
    /// changed by the engine.
    pub fn apply_update(
        &self,
        record: &mut AttendanceRecord,
        update: &AttendanceUpdate,
        ctx: &RuleContext,
    ) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        let previous_type = record.attendance_type;

        if let Some(check_in) = update.check_in {
            record.check_in = check_in;
        }
        if let Some(check_out) = update.check_out {
            record.check_out = check_out;
        }
        if let Some(kind) = update.attendance_type {
            record.attendance_type = kind;
        }

        let switched_to_leave = update
            .attendance_type
            .is_some_and(|kind| kind.is_leave() && kind != previous_type);

        if switched_to_leave {
            let date = Self::leave_reference_date(record.check_in, ctx);
            let window = self.synthesize_leave_window(date, ctx.tz);
            record.check_in = Some(window.check_in);
            record.check_out = Some(window.check_out);
            outcome.leave_window_applied = true;
            tracing::debug!(id = %record.id, kind = %record.attendance_type, %date, "applied leave window");
        } else if update.touches_timestamps() && !record.attendance_type.is_leave() {
            if let Some(check_in) = record.check_in {
                let classified = self.classify_check_in(check_in, ctx.tz);
                if classified != record.attendance_type {
                    tracing::debug!(
                        id = %record.id,
                        from = %record.attendance_type,
                        to = %classified,
                        "reclassified from check-in time"
                    );
                    record.attendance_type = classified;
                    outcome.reclassified = Some(classified);
                }
            }
        }

        record.refresh_derived();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveTime};

    use crate::timezone::{local_time, localize};

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC 3339 timestamp")
    }

    fn local(tz: Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        localize(
            NaiveDate::from_ymd_opt(y, mo, d).unwrap(),
            NaiveTime::from_hms_opt(h, mi, 0).unwrap(),
            tz,
        )
    }

    fn ctx(tz: Tz) -> RuleContext {
        RuleContext::new(tz, utc("2025-03-14T12:00:00Z"))
    }

    fn new_attendance(
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
        attendance_type: Option<AttendanceType>,
    ) -> NewAttendance {
        NewAttendance {
            employee_id: EmployeeId::new("emp-1").unwrap(),
            check_in,
            check_out,
            attendance_type,
        }
    }

    fn create(new: NewAttendance, ctx: &RuleContext) -> AttendanceRecord {
        RuleEngine::default().create(AttendanceId::new("att-1").unwrap(), new, ctx)
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn create_sick_without_timestamps_fills_today() {
        let ctx = ctx(Tz::UTC);
        let record = create(new_attendance(None, None, Some(AttendanceType::Sick)), &ctx);

        assert_eq!(record.check_in, Some(utc("2025-03-14T08:00:00Z")));
        assert_eq!(record.check_out, Some(utc("2025-03-14T17:00:00Z")));
        assert_eq!(record.worked_hours, 0.0);
        assert_eq!(record.color.code(), 1);
        assert_eq!(record.display_label(ctx.tz), "Sick Leave");
    }

    #[test]
    fn create_unpaid_uses_acting_timezone_for_today() {
        // 2025-03-14T12:00Z is already the 15th in Auckland (UTC+13).
        let tz = chrono_tz::Pacific::Auckland;
        let record = create(new_attendance(None, None, Some(AttendanceType::Unpaid)), &ctx(tz));

        assert_eq!(record.check_in, Some(local(tz, 2025, 3, 15, 8, 0)));
        assert_eq!(record.check_out, Some(local(tz, 2025, 3, 15, 17, 0)));
        assert_eq!(record.display_label(tz), "Unpaid Leave");
    }

    #[test]
    fn create_sick_with_check_in_fills_only_check_out() {
        let tz = chrono_tz::Europe::Paris;
        let check_in = local(tz, 2025, 2, 3, 9, 30);
        let record = create(
            new_attendance(Some(check_in), None, Some(AttendanceType::Sick)),
            &ctx(tz),
        );

        assert_eq!(record.check_in, Some(check_in));
        assert_eq!(record.check_out, Some(local(tz, 2025, 2, 3, 17, 0)));
        assert_eq!(record.attendance_type, AttendanceType::Sick);
    }

    #[test]
    fn create_sick_with_only_check_out_uses_that_day() {
        let tz = chrono_tz::Europe::Paris;
        let record = create(
            new_attendance(
                None,
                Some(utc("2025-01-06T17:00:00Z")),
                Some(AttendanceType::Sick),
            ),
            &ctx(tz),
        );

        assert_eq!(record.check_in, Some(local(tz, 2025, 1, 6, 8, 0)));
        assert_eq!(record.check_out, Some(local(tz, 2025, 1, 6, 17, 0)));
        assert!(record.check_in <= record.check_out);
    }

    #[test]
    fn create_sick_keeps_complete_timestamps() {
        let check_in = utc("2025-02-03T10:00:00Z");
        let check_out = utc("2025-02-03T12:00:00Z");
        let record = create(
            new_attendance(Some(check_in), Some(check_out), Some(AttendanceType::Sick)),
            &ctx(Tz::UTC),
        );
        assert_eq!(record.check_in, Some(check_in));
        assert_eq!(record.check_out, Some(check_out));
    }

    #[test]
    fn create_early_check_in_is_present() {
        let tz = chrono_tz::America::Denver;
        let record = create(
            new_attendance(Some(local(tz, 2025, 3, 12, 7, 30)), None, None),
            &ctx(tz),
        );
        assert_eq!(record.attendance_type, AttendanceType::Present);
        assert_eq!(record.color.code(), 10);
    }

    #[test]
    fn create_late_check_in_is_late() {
        let tz = chrono_tz::America::Denver;
        let record = create(
            new_attendance(Some(local(tz, 2025, 3, 12, 8, 15)), None, None),
            &ctx(tz),
        );
        assert_eq!(record.attendance_type, AttendanceType::Late);
        assert_eq!(record.color.code(), 3);
    }

    #[test]
    fn create_explicit_type_is_not_reclassified() {
        let record = create(
            new_attendance(
                Some(utc("2025-03-12T10:00:00Z")),
                None,
                Some(AttendanceType::Present),
            ),
            &ctx(Tz::UTC),
        );
        assert_eq!(record.attendance_type, AttendanceType::Present);
    }

    #[test]
    fn create_without_anything_defaults_to_present() {
        let record = create(new_attendance(None, None, None), &ctx(Tz::UTC));
        assert_eq!(record.attendance_type, AttendanceType::Present);
        assert_eq!(record.check_in, None);
        assert_eq!(record.display_label(Tz::UTC), "0h 0m");
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn create_full_day_computes_hours_and_label() {
        let record = create(
            new_attendance(
                Some(utc("2025-03-12T09:00:00Z")),
                Some(utc("2025-03-12T17:30:00Z")),
                Some(AttendanceType::Present),
            ),
            &ctx(Tz::UTC),
        );
        assert_eq!(record.worked_hours, 8.5);
        assert_eq!(record.display_label(Tz::UTC), "8h 30m(09:00 - 17:30)");
    }

    #[test]
    fn update_check_in_flips_late_to_present() {
        let tz = chrono_tz::Europe::London;
        let ctx = ctx(tz);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(Some(local(tz, 2025, 3, 12, 9, 10)), None, None),
            &ctx,
        );
        assert_eq!(record.attendance_type, AttendanceType::Late);

        let update = AttendanceUpdate {
            check_in: Some(Some(local(tz, 2025, 3, 12, 7, 0))),
            ..AttendanceUpdate::default()
        };
        let outcome = engine.apply_update(&mut record, &update, &ctx);

        assert_eq!(record.attendance_type, AttendanceType::Present);
        assert_eq!(record.color.code(), 10);
        assert_eq!(outcome.reclassified, Some(AttendanceType::Present));
        assert!(!outcome.leave_window_applied);
    }

    #[test]
    fn update_check_in_flips_present_to_late() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(Some(utc("2025-03-12T07:45:00Z")), None, None),
            &ctx,
        );

        let update = AttendanceUpdate {
            check_in: Some(Some(utc("2025-03-12T08:01:00Z"))),
            ..AttendanceUpdate::default()
        };
        engine.apply_update(&mut record, &update, &ctx);
        assert_eq!(record.attendance_type, AttendanceType::Late);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn update_check_out_recomputes_hours_and_keeps_classification() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(Some(utc("2025-03-12T08:30:00Z")), None, None),
            &ctx,
        );

        let update = AttendanceUpdate {
            check_out: Some(Some(utc("2025-03-12T16:45:00Z"))),
            ..AttendanceUpdate::default()
        };
        let outcome = engine.apply_update(&mut record, &update, &ctx);

        assert_eq!(record.attendance_type, AttendanceType::Late);
        assert_eq!(outcome.reclassified, None);
        assert_eq!(record.worked_hours, 8.25);
        assert_eq!(record.display_label(Tz::UTC), "8h 15m(08:30 - 16:45)");
    }

    #[test]
    fn update_timestamps_overrides_explicit_late() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(Some(utc("2025-03-12T07:00:00Z")), None, Some(AttendanceType::Late)),
            &ctx,
        );
        assert_eq!(record.attendance_type, AttendanceType::Late);

        let update = AttendanceUpdate {
            check_out: Some(Some(utc("2025-03-12T15:00:00Z"))),
            ..AttendanceUpdate::default()
        };
        engine.apply_update(&mut record, &update, &ctx);
        assert_eq!(record.attendance_type, AttendanceType::Present);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn update_timestamps_never_touch_leave_type() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(new_attendance(None, None, Some(AttendanceType::Unpaid)), &ctx);

        let update = AttendanceUpdate {
            check_in: Some(Some(utc("2025-03-14T10:00:00Z"))),
            ..AttendanceUpdate::default()
        };
        let outcome = engine.apply_update(&mut record, &update, &ctx);

        assert_eq!(record.attendance_type, AttendanceType::Unpaid);
        assert_eq!(record.check_in, Some(utc("2025-03-14T10:00:00Z")));
        assert_eq!(record.worked_hours, 0.0);
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn update_switch_to_sick_applies_window_on_check_in_date() {
        let tz = chrono_tz::Australia::Sydney;
        let ctx = ctx(tz);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(
                Some(local(tz, 2025, 1, 20, 9, 12)),
                Some(local(tz, 2025, 1, 20, 18, 0)),
                None,
            ),
            &ctx,
        );
        assert_eq!(record.attendance_type, AttendanceType::Late);

        let update = AttendanceUpdate {
            attendance_type: Some(AttendanceType::Sick),
            ..AttendanceUpdate::default()
        };
        let outcome = engine.apply_update(&mut record, &update, &ctx);

        assert!(outcome.leave_window_applied);
        assert_eq!(record.check_in, Some(local(tz, 2025, 1, 20, 8, 0)));
        assert_eq!(record.check_out, Some(local(tz, 2025, 1, 20, 17, 0)));
        assert_eq!(record.worked_hours, 0.0);
        assert_eq!(record.color.code(), 1);
        assert_eq!(
            local_time(record.check_in.unwrap(), tz),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
    }

    #[test]
    fn update_switch_to_leave_without_check_in_uses_today() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(new_attendance(None, None, None), &ctx);

        let update = AttendanceUpdate {
            attendance_type: Some(AttendanceType::Unpaid),
            ..AttendanceUpdate::default()
        };
        engine.apply_update(&mut record, &update, &ctx);

        assert_eq!(record.check_in, Some(utc("2025-03-14T08:00:00Z")));
        assert_eq!(record.check_out, Some(utc("2025-03-14T17:00:00Z")));
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values expected")]
    fn update_leaving_sick_restores_hours() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(new_attendance(None, None, Some(AttendanceType::Sick)), &ctx);

        let update = AttendanceUpdate {
            attendance_type: Some(AttendanceType::Present),
            ..AttendanceUpdate::default()
        };
        let outcome = engine.apply_update(&mut record, &update, &ctx);

        // Type-only edits do not trigger reclassification.
        assert_eq!(record.attendance_type, AttendanceType::Present);
        assert_eq!(outcome.reclassified, None);
        assert_eq!(record.worked_hours, 9.0);
        assert_eq!(record.color.code(), 10);
    }

    #[test]
    fn update_clearing_check_in_skips_classification() {
        let ctx = ctx(Tz::UTC);
        let engine = RuleEngine::default();
        let mut record = create(
            new_attendance(Some(utc("2025-03-12T09:00:00Z")), None, None),
            &ctx,
        );

        let update = AttendanceUpdate {
            check_in: Some(None),
            ..AttendanceUpdate::default()
        };
        engine.apply_update(&mut record, &update, &ctx);

        assert_eq!(record.attendance_type, AttendanceType::Late);
        assert_eq!(record.check_in, None);
        assert_eq!(record.display_label(Tz::UTC), "0h 0m");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(AttendanceUpdate::default().is_empty());
        let update = AttendanceUpdate {
            attendance_type: Some(AttendanceType::Late),
            ..AttendanceUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
