//! Analytics command for the per-type attendance breakdown.

use std::io::Write;

use anyhow::Result;
use att_core::{AnalyticsReport, summarize};
use att_db::AttendanceFilter;
use clap::Args;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &AnalyticsArgs, config: &Config) -> Result<()> {
    let db = open_database(&config.database_path)?;
    let records = db.list_attendances(&AttendanceFilter::default())?;
    let report = summarize(&records);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    write_report(writer, &report)
}

fn write_report<W: Write>(writer: &mut W, report: &AnalyticsReport) -> Result<()> {
    if report.total_records == 0 {
        writeln!(writer, "No attendance recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Attendance analytics ({} records)", report.total_records)?;
    for entry in &report.types {
        writeln!(writer)?;
        writeln!(
            writer,
            "{:<13} {:>4}  {:>6.2}%  {:.2}h worked",
            entry.attendance_type.label(),
            entry.count,
            entry.share_pct,
            entry.worked_hours
        )?;
        for employee in &entry.top_employees {
            writeln!(
                writer,
                "  {:<12} {:>5.1}% ({})",
                employee.employee_id, employee.share_pct, employee.count
            )?;
        }
    }
    Ok(())
}
