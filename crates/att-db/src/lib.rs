//! Storage layer for attendance records.
//!
//! Provides persistence for attendance records using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared across
//! threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2025-01-15T08:00:00.000Z`). This keeps lexicographic ordering equal to
//! chronological ordering and the values readable in the database.
//!
//! ## Derived Fields
//!
//! `worked_hours` and `color` are computed by the rule engine before a record is
//! written. The store persists them as given and never recomputes them.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};
use thiserror::Error;

use att_core::{AttendanceId, AttendanceRecord, AttendanceType, ColorCode, EmployeeId};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A record with the same ID already exists.
    #[error("attendance {0} already exists")]
    Duplicate(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for attendance {attendance_id}: {timestamp}")]
    TimestampParse {
        attendance_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row does not describe a valid record.
    #[error("invalid attendance data for {attendance_id}: {message}")]
    InvalidRecord {
        attendance_id: String,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Selection criteria for [`Database::list_attendances`].
///
/// The check-in range is half-open: inclusive of `start`, exclusive of `end`.
/// Records without a check-in only match when no range bound is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_id: Option<EmployeeId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

const SELECT_COLUMNS: &str =
    "SELECT id, employee_id, check_in, check_out, attendance_type, worked_hours, color FROM attendances";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- attendance_type: present | late | sick | unpaid
            -- color: 1 (red), 3 (yellow), 10 (green)
            CREATE TABLE IF NOT EXISTS attendances (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                check_in TEXT,
                check_out TEXT,
                attendance_type TEXT NOT NULL DEFAULT 'present',
                worked_hours REAL NOT NULL DEFAULT 0,
                color INTEGER NOT NULL DEFAULT 10,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_attendances_employee ON attendances(employee_id);
            CREATE INDEX IF NOT EXISTS idx_attendances_check_in ON attendances(check_in);
            ",
        )?;
        Ok(())
    }

    /// Inserts a new record.
    ///
    /// Fails with [`DbError::Duplicate`] if the ID is already taken.
    pub fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), DbError> {
        self.insert_attendance_at(record, Utc::now())
    }

    fn insert_attendance_at(
        &self,
        record: &AttendanceRecord,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let now = format_timestamp(now);
        let result = self.conn.execute(
            "
            INSERT INTO attendances
            (id, employee_id, check_in, check_out, attendance_type, worked_hours, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                record.id.as_str(),
                record.employee_id.as_str(),
                record.check_in.map(format_timestamp),
                record.check_out.map(format_timestamp),
                record.attendance_type.as_str(),
                record.worked_hours,
                record.color.code(),
                now,
                now,
            ],
        );
        match result {
            Ok(_) => {
                tracing::debug!(id = %record.id, "inserted attendance");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(DbError::Duplicate(record.id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrites a stored record with `record`.
    ///
    /// Returns `false` if no record with that ID exists.
    pub fn update_attendance(&self, record: &AttendanceRecord) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "
            UPDATE attendances
            SET employee_id = ?, check_in = ?, check_out = ?, attendance_type = ?,
                worked_hours = ?, color = ?, updated_at = ?
            WHERE id = ?
            ",
            params![
                record.employee_id.as_str(),
                record.check_in.map(format_timestamp),
                record.check_out.map(format_timestamp),
                record.attendance_type.as_str(),
                record.worked_hours,
                record.color.code(),
                format_timestamp(Utc::now()),
                record.id.as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Fetches a record by ID.
    pub fn get_attendance(&self, id: &AttendanceId) -> Result<Option<AttendanceRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?"),
                [id.as_str()],
                AttendanceRow::from_row,
            )
            .optional()?;
        row.map(AttendanceRow::into_record).transpose()
    }

    /// Lists records matching `filter`, ordered by check-in then ID.
    ///
    /// Records without a check-in sort last.
    pub fn list_attendances(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, DbError> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if end <= start {
                return Ok(Vec::new());
            }
        }

        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(employee_id) = &filter.employee_id {
            clauses.push("employee_id = ?");
            values.push(employee_id.to_string());
        }
        if let Some(start) = filter.start {
            clauses.push("check_in >= ?");
            values.push(format_timestamp(start));
        }
        if let Some(end) = filter.end {
            clauses.push("check_in < ?");
            values.push(format_timestamp(end));
        }

        let mut sql = SELECT_COLUMNS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY check_in IS NULL, check_in ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), AttendanceRow::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    /// Counts all stored records.
    pub fn count_attendances(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM attendances", [], |row| row.get(0))?;
        Ok(count)
    }

    /// The most recent check-in across all records.
    pub fn last_check_in(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(check_in) FROM attendances", [], |row| row.get(0))?;
        latest
            .map(|timestamp| parse_timestamp(&timestamp, "(latest)"))
            .transpose()
    }
}

/// A row as stored, before validation.
struct AttendanceRow {
    id: String,
    employee_id: String,
    check_in: Option<String>,
    check_out: Option<String>,
    attendance_type: String,
    worked_hours: f64,
    color: i64,
}

impl AttendanceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            check_in: row.get(2)?,
            check_out: row.get(3)?,
            attendance_type: row.get(4)?,
            worked_hours: row.get(5)?,
            color: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<AttendanceRecord, DbError> {
        let invalid = |message: String| DbError::InvalidRecord {
            attendance_id: self.id.clone(),
            message,
        };

        let employee_id =
            EmployeeId::new(self.employee_id.as_str()).map_err(|err| invalid(err.to_string()))?;
        let attendance_type: AttendanceType = self
            .attendance_type
            .parse()
            .map_err(|err: att_core::UnknownAttendanceType| invalid(err.to_string()))?;
        let color = ColorCode::from_code(self.color)
            .ok_or_else(|| invalid(format!("unknown color code {}", self.color)))?;
        let check_in = self
            .check_in
            .as_deref()
            .map(|ts| parse_timestamp(ts, &self.id))
            .transpose()?;
        let check_out = self
            .check_out
            .as_deref()
            .map(|ts| parse_timestamp(ts, &self.id))
            .transpose()?;
        let id = AttendanceId::new(self.id.as_str()).map_err(|err| invalid(err.to_string()))?;

        Ok(AttendanceRecord {
            id,
            employee_id,
            check_in,
            check_out,
            attendance_type,
            worked_hours: self.worked_hours,
            color,
        })
    }
}

fn parse_timestamp(timestamp: &str, attendance_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            attendance_id: attendance_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
