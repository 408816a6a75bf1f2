use crate::model::{parse_date, HomeworkRecord, HomeworkStatus, Student};
use crate::roster;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayProgress {
    pub total_today: usize,
    pub satisfied_today: usize,
    pub missing_today: usize,
    pub progress_percent: u32,
}

/// Progress over records dated `today`. An empty day is 0%, not an error.
pub fn today_progress(records: &[HomeworkRecord], today: &str) -> TodayProgress {
    let mut total_today = 0usize;
    let mut satisfied_today = 0usize;
    let mut missing_today = 0usize;

    for r in records.iter().filter(|r| r.date == today) {
        total_today += 1;
        if r.status.is_satisfied() {
            satisfied_today += 1;
        }
        if r.status == HomeworkStatus::Missing {
            missing_today += 1;
        }
    }

    let progress_percent = if total_today > 0 {
        (satisfied_today as f64 / total_today as f64 * 100.0).round() as u32
    } else {
        0
    };

    TodayProgress {
        total_today,
        satisfied_today,
        missing_today,
        progress_percent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningPolicy {
    /// Minimum in-window missing count to be listed.
    pub threshold: usize,
    /// The window starts this many days before today, inclusive.
    pub window_days: i64,
}

impl Default for WarningPolicy {
    fn default() -> Self {
        Self {
            threshold: 3,
            window_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningEntry {
    pub student: &'static Student,
    pub count: usize,
}

/// Students whose missing count since `today - window_days` reaches the threshold.
///
/// Output order is the order in which each student is first seen in the
/// record scan, not the count. Two missing records on the same day count
/// twice. Records with unparseable dates and students not on the roster are
/// skipped.
pub fn weekly_warnings(
    records: &[HomeworkRecord],
    today: NaiveDate,
    policy: WarningPolicy,
) -> Vec<WarningEntry> {
    let window_start = today - Duration::days(policy.window_days);

    let mut order: Vec<i64> = Vec::new();
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for r in records {
        if r.status != HomeworkStatus::Missing {
            continue;
        }
        let Some(date) = parse_date(&r.date) else {
            continue;
        };
        if date < window_start {
            continue;
        }
        let count = counts.entry(r.student_id).or_insert_with(|| {
            order.push(r.student_id);
            0
        });
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|student_id| {
            let count = counts.get(&student_id).copied().unwrap_or(0);
            if count < policy.threshold {
                return None;
            }
            roster::find(student_id).map(|student| WarningEntry { student, count })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Exact `YYYY-MM-DD` match when set.
    pub date: Option<String>,
    /// Substring of the student's name when set.
    pub student_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub id: String,
    pub date: String,
    pub homework_name: String,
    pub student_id: i64,
    pub student_name: Option<&'static str>,
    pub status: HomeworkStatus,
    pub status_label: &'static str,
    pub updated_at: i64,
}

/// Filtered records, newest `updated_at` first.
pub fn history(records: &[HomeworkRecord], query: &HistoryQuery) -> Vec<HistoryRow> {
    let date = query.date.as_deref().filter(|d| !d.is_empty());
    let name = query.student_name.as_deref().filter(|n| !n.is_empty());

    let mut rows: Vec<HistoryRow> = records
        .iter()
        .filter_map(|r| {
            let student = roster::find(r.student_id);
            if date.is_some_and(|d| r.date != d) {
                return None;
            }
            if let Some(n) = name {
                if !student.is_some_and(|s| s.name.contains(n)) {
                    return None;
                }
            }
            Some(HistoryRow {
                id: r.id.clone(),
                date: r.date.clone(),
                homework_name: r.homework_name.clone(),
                student_id: r.student_id,
                student_name: student.map(|s| s.name),
                status: r.status,
                status_label: r.status.label(),
                updated_at: r.updated_at,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    rows
}
