//! Attendance breakdown for the analytics chart.
//!
//! For each attendance type the report carries its share of all records and
//! the employees who spend the largest share of their own records in it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::attendance_type::AttendanceType;
use crate::record::AttendanceRecord;
use crate::types::EmployeeId;

/// Number of employees listed per type.
pub const TOP_EMPLOYEES: usize = 8;

/// Chart data for all attendance types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// Number of records considered.
    pub total_records: usize,
    /// One entry per type, in [`AttendanceType::ALL`] order.
    pub types: Vec<TypeBreakdown>,
}

/// Aggregates for one attendance type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub attendance_type: AttendanceType,
    pub count: usize,
    /// Share of all records, in percent rounded to two decimals.
    pub share_pct: f64,
    /// Sum of worked hours over records of this type.
    pub worked_hours: f64,
    /// Employees with at least one record of this type, highest share first.
    pub top_employees: Vec<EmployeeShare>,
}

/// An employee's share of their own records spent in one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeShare {
    pub employee_id: EmployeeId,
    pub count: usize,
    /// Percent of this employee's records, rounded to one decimal.
    pub share_pct: f64,
}

#[derive(Default)]
struct EmployeeTally {
    counts: BTreeMap<AttendanceType, usize>,
    total: usize,
}

/// Builds the chart data from a set of records.
#[allow(clippy::cast_precision_loss)]
pub fn summarize<'a, I>(records: I) -> AnalyticsReport
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut type_counts: BTreeMap<AttendanceType, usize> = BTreeMap::new();
    let mut type_hours: BTreeMap<AttendanceType, f64> = BTreeMap::new();
    let mut employees: BTreeMap<&EmployeeId, EmployeeTally> = BTreeMap::new();
    let mut total_records = 0;

    for record in records {
        total_records += 1;
        *type_counts.entry(record.attendance_type).or_default() += 1;
        *type_hours.entry(record.attendance_type).or_default() += record.worked_hours;

        let tally = employees.entry(&record.employee_id).or_default();
        *tally.counts.entry(record.attendance_type).or_default() += 1;
        tally.total += 1;
    }

    let types = AttendanceType::ALL
        .iter()
        .map(|&kind| {
            let count = type_counts.get(&kind).copied().unwrap_or(0);
            let share_pct = if total_records > 0 {
                round_to(count as f64 / total_records as f64 * 100.0, 2)
            } else {
                0.0
            };

            let mut top_employees: Vec<EmployeeShare> = employees
                .iter()
                .filter_map(|(employee_id, tally)| {
                    let count = tally.counts.get(&kind).copied().unwrap_or(0);
                    (count > 0).then(|| EmployeeShare {
                        employee_id: (*employee_id).clone(),
                        count,
                        share_pct: round_to(count as f64 / tally.total as f64 * 100.0, 1),
                    })
                })
                .collect();
            // Stable sort keeps employee ID order among equal shares.
            top_employees.sort_by(|a, b| b.share_pct.total_cmp(&a.share_pct));
            top_employees.truncate(TOP_EMPLOYEES);

            TypeBreakdown {
                attendance_type: kind,
                count,
                share_pct,
                worked_hours: type_hours.get(&kind).copied().unwrap_or(0.0),
                top_employees,
            }
        })
        .collect();

    AnalyticsReport {
        total_records,
        types,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
