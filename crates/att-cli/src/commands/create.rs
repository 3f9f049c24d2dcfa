//! Create command for recording a new attendance.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceId, AttendanceType, EmployeeId, NewAttendance, RuleContext};
use clap::Args;
use uuid::Uuid;

use super::show::describe_record;
use super::util::{open_database, parse_datetime};
use crate::Config;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Employee the attendance belongs to.
    #[arg(long)]
    pub employee: String,
    /// Check-in time (RFC 3339, local "YYYY-MM-DD HH:MM", local "HH:MM", or "N hours ago").
    #[arg(long)]
    pub check_in: Option<String>,
    /// Check-out time, same formats as --check-in.
    #[arg(long)]
    pub check_out: Option<String>,
    /// Attendance type (present, late, sick, unpaid). Inferred from check-in when omitted.
    #[arg(long = "type", value_name = "TYPE")]
    pub attendance_type: Option<AttendanceType>,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &CreateArgs,
    config: &Config,
    ctx: &RuleContext,
) -> Result<()> {
    let id = AttendanceId::new(Uuid::new_v4().to_string())?;
    create_with_id(writer, args, config, ctx, id)
}

fn create_with_id<W: Write>(
    writer: &mut W,
    args: &CreateArgs,
    config: &Config,
    ctx: &RuleContext,
    id: AttendanceId,
) -> Result<()> {
    let employee_id = EmployeeId::new(args.employee.as_str())?;
    let check_in = args
        .check_in
        .as_deref()
        .map(|s| parse_datetime(s, ctx))
        .transpose()
        .context("invalid --check-in")?;
    let check_out = args
        .check_out
        .as_deref()
        .map(|s| parse_datetime(s, ctx))
        .transpose()
        .context("invalid --check-out")?;

    let engine = config.rule_engine().context("invalid rule configuration")?;
    let record = engine.create(
        id,
        NewAttendance {
            employee_id,
            check_in,
            check_out,
            attendance_type: args.attendance_type,
        },
        ctx,
    );

    let db = open_database(&config.database_path)?;
    db.insert_attendance(&record)?;
    tracing::info!(id = %record.id, kind = %record.attendance_type, "attendance created");

    writeln!(writer, "Created attendance {}", record.id)?;
    describe_record(writer, &record, ctx.tz)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::Tz;
    use att_db::Database;
    use insta::assert_snapshot;

    fn test_config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("att.db"),
            ..Config::default()
        }
    }

    fn ctx(tz: Tz) -> RuleContext {
        RuleContext::new(tz, "2025-03-14T12:00:00Z".parse().unwrap())
    }

    fn args(employee: &str) -> CreateArgs {
        CreateArgs {
            employee: employee.to_string(),
            check_in: None,
            check_out: None,
            attendance_type: None,
        }
    }

    fn create(config: &Config, args: &CreateArgs, ctx: &RuleContext, id: &str) -> String {
        let mut output = Vec::new();
        create_with_id(
            &mut output,
            args,
            config,
            ctx,
            AttendanceId::new(id).unwrap(),
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn create_sick_day_without_times() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(&temp);
        let args = CreateArgs {
            attendance_type: Some(AttendanceType::Sick),
            ..args("alice")
        };

        let output = create(&config, &args, &ctx(Tz::UTC), "att-1");
        assert_snapshot!(output, @r"
        Created attendance att-1
          Employee:     alice
          Type:         sick (Sick Leave)
          Check-in:     2025-03-14 08:00
          Check-out:    2025-03-14 17:00
          Worked hours: 0.00
          Color:        1 (red)
          Label:        Sick Leave
        ");

        let db = Database::open(&config.database_path).unwrap();
        let stored = db
            .get_attendance(&AttendanceId::new("att-1").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.check_in, Some("2025-03-14T08:00:00Z".parse().unwrap()));
        assert_eq!(stored.color.code(), 1);
    }

    #[test]
    fn create_classifies_from_local_check_in() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(&temp);
        let ctx = ctx(Tz::America__New_York);

        let early = CreateArgs {
            check_in: Some("2025-03-12 07:30".to_string()),
            ..args("alice")
        };
        let late = CreateArgs {
            check_in: Some("2025-03-12 08:15".to_string()),
            ..args("bob")
        };
        create(&config, &early, &ctx, "early");
        create(&config, &late, &ctx, "late");

        let db = Database::open(&config.database_path).unwrap();
        let early = db
            .get_attendance(&AttendanceId::new("early").unwrap())
            .unwrap()
            .unwrap();
        let late = db
            .get_attendance(&AttendanceId::new("late").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(early.attendance_type, AttendanceType::Present);
        assert_eq!(early.color.code(), 10);
        assert_eq!(late.attendance_type, AttendanceType::Late);
        assert_eq!(late.color.code(), 3);
    }

    #[test]
    fn create_respects_configured_threshold() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = test_config(&temp);
        config.rules.late_threshold = chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let args = CreateArgs {
            check_in: Some("2025-03-12T08:30:00Z".to_string()),
            ..args("alice")
        };
        let output = create(&config, &args, &ctx(Tz::UTC), "att-9");
        assert!(output.contains("Type:         present (Present)"));
    }

    #[test]
    fn create_rejects_bad_time() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(&temp);
        let args = CreateArgs {
            check_in: Some("whenever".to_string()),
            ..args("alice")
        };
        let err = create_with_id(
            &mut Vec::new(),
            &args,
            &config,
            &ctx(Tz::UTC),
            AttendanceId::new("x").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid --check-in");
    }

    #[test]
    fn create_rejects_blank_employee() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(&temp);
        let err = run(&mut Vec::new(), &args(" "), &config, &ctx(Tz::UTC)).unwrap_err();
        assert_eq!(err.to_string(), "employee ID cannot be empty");
    }
}
