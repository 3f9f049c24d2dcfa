//! List command for attendance records in a period.

use std::io::Write;

use anyhow::Result;
use att_core::timezone::localize;
use att_core::{AttendanceRecord, EmployeeId, RuleContext, Tz};
use att_db::AttendanceFilter;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;

use super::show::{RecordView, format_local};
use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
#[command(group = clap::ArgGroup::new("period").multiple(false))]
pub struct ListArgs {
    /// Only records of this employee.
    #[arg(long)]
    pub employee: Option<String>,
    /// Records checked in today.
    #[arg(long, group = "period")]
    pub day: bool,
    /// Records checked in this week (Monday to Sunday).
    #[arg(long, group = "period")]
    pub week: bool,
    /// Records checked in last week.
    #[arg(long, group = "period")]
    pub last_week: bool,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Period selection for `att list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Day,
    Week,
    LastWeek,
}

impl ListArgs {
    const fn period(&self) -> Period {
        if self.day {
            Period::Day
        } else if self.week {
            Period::Week
        } else if self.last_week {
            Period::LastWeek
        } else {
            Period::All
        }
    }
}

fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    localize(date, NaiveTime::default(), tz)
}

/// Half-open UTC bounds of `period` around `today` in `tz`.
pub fn period_bounds(
    period: Period,
    today: NaiveDate,
    tz: Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let (start, end) = match period {
        Period::All => return None,
        Period::Day => (today, today + Duration::days(1)),
        Period::Week => (monday, monday + Duration::days(7)),
        Period::LastWeek => (monday - Duration::days(7), monday),
    };
    Some((local_midnight(start, tz), local_midnight(end, tz)))
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &ListArgs,
    config: &Config,
    ctx: &RuleContext,
) -> Result<()> {
    let employee_id = args.employee.as_deref().map(EmployeeId::new).transpose()?;
    let bounds = period_bounds(args.period(), ctx.today(), ctx.tz);
    let filter = AttendanceFilter {
        employee_id,
        start: bounds.map(|(start, _)| start),
        end: bounds.map(|(_, end)| end),
    };

    let db = open_database(&config.database_path)?;
    let records = db.list_attendances(&filter)?;
    tracing::debug!(count = records.len(), ?filter, "listed attendances");

    if args.json {
        let views: Vec<RecordView<'_>> = records
            .iter()
            .map(|record| RecordView::new(record, ctx.tz))
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(());
    }

    write_table(writer, &records, ctx.tz)
}

fn write_table<W: Write>(writer: &mut W, records: &[AttendanceRecord], tz: Tz) -> Result<()> {
    if records.is_empty() {
        writeln!(writer, "No attendance recorded.")?;
        return Ok(());
    }

    let employee_width = records
        .iter()
        .map(|record| record.employee_id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("EMPLOYEE".len());

    writeln!(
        writer,
        "{:<16}  {:<employee_width$}  {:<7}  {:>5}  LABEL",
        "DATE", "EMPLOYEE", "TYPE", "COLOR"
    )?;
    for record in records {
        writeln!(
            writer,
            "{:<16}  {:<employee_width$}  {:<7}  {:>5}  {}",
            format_local(record.check_in, tz),
            record.employee_id,
            record.attendance_type,
            record.color.code(),
            record.display_label(tz)
        )?;
    }
    Ok(())
}
