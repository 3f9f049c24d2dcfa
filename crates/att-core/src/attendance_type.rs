//! Attendance type enum as the single source of truth for type strings and colors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a single attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AttendanceType {
    #[default]
    Present,
    Late,
    Sick,
    Unpaid,
}

impl AttendanceType {
    /// All variants in display order.
    pub const ALL: [Self; 4] = [Self::Present, Self::Late, Self::Sick, Self::Unpaid];

    /// String representation for storage and the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::Sick => "sick",
            Self::Unpaid => "unpaid",
        }
    }

    /// Human-readable name, used as the label of leave records.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Late => "Late Arrival",
            Self::Sick => "Sick Leave",
            Self::Unpaid => "Unpaid Leave",
        }
    }

    /// Whether this type is a full day of leave (sick or unpaid).
    ///
    /// Leave records never accrue worked hours and are never reclassified
    /// from their check-in time.
    pub const fn is_leave(&self) -> bool {
        matches!(self, Self::Sick | Self::Unpaid)
    }

    /// Calendar color for this type.
    pub const fn color(&self) -> ColorCode {
        match self {
            Self::Sick | Self::Unpaid => ColorCode::Red,
            Self::Late => ColorCode::Yellow,
            Self::Present => ColorCode::Green,
        }
    }
}

impl fmt::Display for AttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AttendanceType {
    type Err = UnknownAttendanceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "late" => Ok(Self::Late),
            "sick" => Ok(Self::Sick),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(UnknownAttendanceType(s.to_string())),
        }
    }
}

impl Serialize for AttendanceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttendanceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown attendance type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttendanceType(String);

impl fmt::Display for UnknownAttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown attendance type: {}", self.0)
    }
}

impl std::error::Error for UnknownAttendanceType {}

/// Integer color tag consumed by calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCode {
    Red,
    Yellow,
    Green,
}

impl ColorCode {
    /// The integer tag stored alongside the record.
    pub const fn code(&self) -> i64 {
        match self {
            Self::Red => 1,
            Self::Yellow => 3,
            Self::Green => 10,
        }
    }

    /// Looks up a color by its integer tag.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Red),
            3 => Some(Self::Yellow),
            10 => Some(Self::Green),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl Serialize for ColorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}
