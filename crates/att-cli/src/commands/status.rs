//! Status command for showing the store and the active rules.

use std::io::Write;

use anyhow::Result;
use att_core::Tz;
use att_core::rules::format_time_of_day;

use super::show::format_local;
use super::util::open_database;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config, tz: Tz) -> Result<()> {
    let db = open_database(&config.database_path)?;
    let count = db.count_attendances()?;
    let last_check_in = db.last_check_in()?;
    let rules = &config.rules;

    writeln!(writer, "Attendance tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Timezone: {tz}")?;
    writeln!(writer, "Late after: {}", format_time_of_day(rules.late_threshold))?;
    writeln!(
        writer,
        "Leave window: {} - {}",
        format_time_of_day(rules.leave_start),
        format_time_of_day(rules.leave_end)
    )?;
    writeln!(writer, "Records: {count}")?;
    let last_check_in = last_check_in.map_or_else(
        || "never".to_string(),
        |instant| format_local(Some(instant), tz),
    );
    writeln!(writer, "Last check-in: {last_check_in}")?;

    Ok(())
}
