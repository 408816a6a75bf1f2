use crate::model::{HomeworkRecord, HomeworkStatus, Student};

/// Parent-facing missing-homework notice.
///
/// Covers the student's entire missing history, not just the warning window.
pub fn build(student: &Student, records: &[HomeworkRecord]) -> String {
    let lines: Vec<String> = records
        .iter()
        .filter(|r| r.student_id == student.id && r.status == HomeworkStatus::Missing)
        .map(|r| format!("- {} {}", r.date, r.homework_name))
        .collect();

    format!(
        "【作業缺交通知】\n家長您好，{} 同學近期有以下作業尚未繳交：\n{}\n請協助督促孩子完成，謝謝。",
        student.name,
        lines.join("\n")
    )
}
