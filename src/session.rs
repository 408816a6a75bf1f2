//! Per-group draft of submission statuses prior to commit.

use crate::error::{HomeworkError, HomeworkResult};
use crate::model::{parse_date, HomeworkRecord, HomeworkStatus};
use crate::roster;
use std::collections::BTreeMap;

/// `NotStarted -> Active -> (committed | abandoned) -> NotStarted`.
///
/// The draft is keyed by student id, so commit order is ascending roll number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntrySession {
    #[default]
    NotStarted,
    Active {
        group: u8,
        draft: BTreeMap<i64, HomeworkStatus>,
    },
}

impl EntrySession {
    /// Every member of `group` starts out as submitted; the aide marks exceptions.
    pub fn start(group: u8) -> HomeworkResult<Self> {
        if !roster::is_group(group) {
            return Err(HomeworkError::validation(format!("unknown group: {}", group)));
        }
        let draft = roster::in_group(group)
            .map(|s| (s.id, HomeworkStatus::Submitted))
            .collect();
        Ok(Self::Active { group, draft })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn group(&self) -> Option<u8> {
        match self {
            Self::Active { group, .. } => Some(*group),
            Self::NotStarted => None,
        }
    }

    pub fn draft(&self) -> Option<&BTreeMap<i64, HomeworkStatus>> {
        match self {
            Self::Active { draft, .. } => Some(draft),
            Self::NotStarted => None,
        }
    }

    pub fn set_status(&mut self, student_id: i64, status: HomeworkStatus) -> HomeworkResult<()> {
        let Self::Active { draft, .. } = self else {
            return Err(HomeworkError::invalid_state("no entry session in progress"));
        };
        let Some(slot) = draft.get_mut(&student_id) else {
            return Err(HomeworkError::validation(format!(
                "student {} is not in the selected group",
                student_id
            )));
        };
        *slot = status;
        Ok(())
    }

    /// Materializes one record per draft entry and resets to `NotStarted`.
    ///
    /// Records get consecutive `updated_at` stamps starting at `now_ms`. On a
    /// validation failure the draft is left exactly as it was.
    pub fn commit(
        &mut self,
        date: &str,
        homework_name: &str,
        now_ms: i64,
    ) -> HomeworkResult<Vec<HomeworkRecord>> {
        let Self::Active { draft, .. } = self else {
            return Err(HomeworkError::invalid_state("no entry session in progress"));
        };
        let homework_name = homework_name.trim();
        if homework_name.is_empty() {
            return Err(HomeworkError::validation("assignment name must not be empty"));
        }
        let date = date.trim();
        if date.is_empty() {
            return Err(HomeworkError::validation("date must not be empty"));
        }
        if parse_date(date).is_none() {
            return Err(HomeworkError::validation("date must be YYYY-MM-DD"));
        }

        let records = draft
            .iter()
            .enumerate()
            .map(|(i, (&student_id, &status))| {
                let updated_at = now_ms + i as i64;
                HomeworkRecord {
                    id: HomeworkRecord::make_id(date, homework_name, student_id, updated_at),
                    date: date.to_string(),
                    homework_name: homework_name.to_string(),
                    student_id,
                    status,
                    updated_at,
                }
            })
            .collect();
        *self = Self::NotStarted;
        Ok(records)
    }

    /// Discards the draft without a trace.
    pub fn abandon(&mut self) {
        *self = Self::NotStarted;
    }
}
