use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a record date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Doubles as the roll number shown to teachers.
    pub id: i64,
    pub name: &'static str,
    pub group: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    Submitted,
    Missing,
    Late,
    NeedsCorrection,
    Corrected,
}

impl HomeworkStatus {
    /// Display order of the status buttons.
    pub const ALL: [HomeworkStatus; 5] = [
        HomeworkStatus::Submitted,
        HomeworkStatus::Missing,
        HomeworkStatus::Late,
        HomeworkStatus::NeedsCorrection,
        HomeworkStatus::Corrected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HomeworkStatus::Submitted => "已交",
            HomeworkStatus::Missing => "缺交",
            HomeworkStatus::Late => "補交",
            HomeworkStatus::NeedsCorrection => "需訂正",
            HomeworkStatus::Corrected => "已訂正",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Submitted => "submitted",
            HomeworkStatus::Missing => "missing",
            HomeworkStatus::Late => "late",
            HomeworkStatus::NeedsCorrection => "needs_correction",
            HomeworkStatus::Corrected => "corrected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// Submitted and Corrected both count toward progress.
    pub fn is_satisfied(self) -> bool {
        matches!(self, HomeworkStatus::Submitted | HomeworkStatus::Corrected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkItem {
    pub id: String,
    pub name: String,
}

/// One submission-status observation. `homework_name` is a snapshot, not a
/// reference into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRecord {
    pub id: String,
    pub date: String,
    pub homework_name: String,
    pub student_id: i64,
    pub status: HomeworkStatus,
    pub updated_at: i64,
}

impl HomeworkRecord {
    pub fn make_id(date: &str, homework_name: &str, student_id: i64, updated_at: i64) -> String {
        format!("{}-{}-{}-{}", date, homework_name, student_id, updated_at)
    }
}
