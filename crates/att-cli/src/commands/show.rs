//! Show command for displaying a single attendance record.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceId, AttendanceRecord, Tz};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Attendance ID.
    pub id: String,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A record with its label rendered for a timezone.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a AttendanceRecord,
    pub display_label: String,
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a AttendanceRecord, tz: Tz) -> Self {
        Self {
            record,
            display_label: record.display_label(tz),
        }
    }
}

/// Formats an optional instant as local `YYYY-MM-DD HH:MM`, or `-`.
pub fn format_local(instant: Option<DateTime<Utc>>, tz: Tz) -> String {
    instant.map_or_else(
        || "-".to_string(),
        |instant| instant.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Multi-line description of a record in `tz`.
pub fn describe_record<W: Write>(
    writer: &mut W,
    record: &AttendanceRecord,
    tz: Tz,
) -> std::io::Result<()> {
    writeln!(writer, "  Employee:     {}", record.employee_id)?;
    writeln!(
        writer,
        "  Type:         {} ({})",
        record.attendance_type,
        record.attendance_type.label()
    )?;
    writeln!(writer, "  Check-in:     {}", format_local(record.check_in, tz))?;
    writeln!(writer, "  Check-out:    {}", format_local(record.check_out, tz))?;
    writeln!(writer, "  Worked hours: {:.2}", record.worked_hours)?;
    writeln!(
        writer,
        "  Color:        {} ({})",
        record.color.code(),
        record.color.name()
    )?;
    writeln!(writer, "  Label:        {}", record.display_label(tz))?;
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, args: &ShowArgs, config: &Config, tz: Tz) -> Result<()> {
    let id = AttendanceId::new(args.id.as_str())?;
    let db = open_database(&config.database_path)?;
    let record = db
        .get_attendance(&id)?
        .with_context(|| format!("attendance not found: {id}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&RecordView::new(&record, tz))?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    writeln!(writer, "Attendance {id} ({tz})")?;
    describe_record(writer, &record, tz)?;
    Ok(())
}
