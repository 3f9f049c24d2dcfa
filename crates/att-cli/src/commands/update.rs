//! Update command for editing an existing attendance.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceId, AttendanceType, AttendanceUpdate, RuleContext};
use clap::Args;

use super::show::describe_record;
use super::util::{open_database, parse_datetime};
use crate::Config;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Attendance ID.
    pub id: String,
    /// New check-in time.
    #[arg(long)]
    pub check_in: Option<String>,
    /// New check-out time.
    #[arg(long, conflicts_with = "clear_check_out")]
    pub check_out: Option<String>,
    /// Remove the check-out time.
    #[arg(long)]
    pub clear_check_out: bool,
    /// New attendance type (present, late, sick, unpaid).
    #[arg(long = "type", value_name = "TYPE")]
    pub attendance_type: Option<AttendanceType>,
}

impl UpdateArgs {
    fn to_update(&self, ctx: &RuleContext) -> Result<AttendanceUpdate> {
        let check_in = self
            .check_in
            .as_deref()
            .map(|s| parse_datetime(s, ctx))
            .transpose()
            .context("invalid --check-in")?;
        let check_out = if self.clear_check_out {
            Some(None)
        } else {
            self.check_out
                .as_deref()
                .map(|s| parse_datetime(s, ctx).map(Some))
                .transpose()
                .context("invalid --check-out")?
        };

        Ok(AttendanceUpdate {
            check_in: check_in.map(Some),
            check_out,
            attendance_type: self.attendance_type,
        })
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &UpdateArgs,
    config: &Config,
    ctx: &RuleContext,
) -> Result<()> {
    let id = AttendanceId::new(args.id.as_str())?;
    let update = args.to_update(ctx)?;
    if update.is_empty() {
        anyhow::bail!("nothing to update: pass --check-in, --check-out, --clear-check-out or --type");
    }

    let engine = config.rule_engine().context("invalid rule configuration")?;
    let db = open_database(&config.database_path)?;
    let mut record = db
        .get_attendance(&id)?
        .with_context(|| format!("attendance not found: {id}"))?;

    let outcome = engine.apply_update(&mut record, &update, ctx);
    if !db.update_attendance(&record)? {
        anyhow::bail!("attendance not found: {id}");
    }
    tracing::info!(%id, ?outcome, "attendance updated");

    writeln!(writer, "Updated attendance {id}")?;
    if let Some(kind) = outcome.reclassified {
        writeln!(writer, "Reclassified as {kind} from the check-in time.")?;
    }
    if outcome.leave_window_applied {
        writeln!(writer, "Leave window applied.")?;
    }
    describe_record(writer, &record, ctx.tz)?;
    Ok(())
}
