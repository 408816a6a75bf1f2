use crate::analytics::{today_progress, weekly_warnings};
use crate::error::HomeworkError;
use crate::ipc::error::{homework_err, ok};
use crate::ipc::handlers::setup;
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::{notify, roster};
use serde_json::json;

fn handle_dashboard_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::teacher_app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let today = match helpers::today_str(req, app) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let progress = today_progress(app.records(), &today);
    ok(
        &req.id,
        json!({
            "today": today,
            "totalToday": progress.total_today,
            "satisfiedToday": progress.satisfied_today,
            "missingToday": progress.missing_today,
            "progressPercent": progress.progress_percent,
        }),
    )
}

fn handle_dashboard_warnings(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::teacher_app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let today = match helpers::today(req, app) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let policy = match setup::warning_policy(app.store()) {
        Ok(p) => p,
        Err(e) => return homework_err(&req.id, &e),
    };
    let warnings = weekly_warnings(app.records(), today, policy);
    ok(
        &req.id,
        json!({
            "threshold": policy.threshold,
            "windowDays": policy.window_days,
            "warnings": warnings,
        }),
    )
}

fn handle_dashboard_notification(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::teacher_app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let student_id = match helpers::required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(student) = roster::find(student_id) else {
        let e = HomeworkError::NotFound(format!("student {}", student_id));
        return homework_err(&req.id, &e);
    };
    ok(
        &req.id,
        json!({
            "studentId": student.id,
            "text": notify::build(student, app.records()),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_dashboard_stats(state, req)),
        "dashboard.warnings" => Some(handle_dashboard_warnings(state, req)),
        "dashboard.notification" => Some(handle_dashboard_notification(state, req)),
        _ => None,
    }
}
