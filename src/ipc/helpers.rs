use crate::app::{Action, App};
use crate::error::HomeworkError;
use crate::ipc::error::{err, homework_err, ok_with_warnings};
use crate::ipc::types::{AppState, Request};
use crate::model::{format_date, parse_date, HomeworkStatus};
use crate::store::SqliteBlobStore;
use chrono::NaiveDate;
use serde_json::json;

pub type HandlerResult<T> = Result<T, serde_json::Value>;

pub fn app_ref<'a>(state: &'a AppState, req: &Request) -> HandlerResult<&'a App<SqliteBlobStore>> {
    state
        .app
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn app_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> HandlerResult<&'a mut App<SqliteBlobStore>> {
    state
        .app
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Like `app_ref`, but only while a teacher view is open.
pub fn teacher_app_ref<'a>(
    state: &'a AppState,
    req: &Request,
) -> HandlerResult<&'a App<SqliteBlobStore>> {
    let app = app_ref(state, req)?;
    app.require_teacher().map_err(|e| homework_err(&req.id, &e))?;
    Ok(app)
}

pub fn required_str(req: &Request, key: &str) -> HandlerResult<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> HandlerResult<Option<String>> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be string", key), None)),
    }
}

pub fn required_i64(req: &Request, key: &str) -> HandlerResult<i64> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_status(req: &Request, key: &str) -> HandlerResult<HomeworkStatus> {
    let raw = required_str(req, key)?;
    HomeworkStatus::parse(&raw).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("unknown status: {}", raw),
            Some(json!({
                "allowed": HomeworkStatus::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>()
            })),
        )
    })
}

/// `params.today` when given, otherwise the app clock's local date.
pub fn today(req: &Request, app: &App<SqliteBlobStore>) -> HandlerResult<NaiveDate> {
    match optional_str(req, "today")? {
        None => Ok(app.today()),
        Some(s) => parse_date(&s)
            .ok_or_else(|| err(&req.id, "bad_params", "today must be YYYY-MM-DD", None)),
    }
}

pub fn today_str(req: &Request, app: &App<SqliteBlobStore>) -> HandlerResult<String> {
    today(req, app).map(format_date)
}

/// Snapshot of the view state for the UI.
pub fn view_json(app: &App<SqliteBlobStore>) -> serde_json::Value {
    let s = app.state();
    let draft: Vec<serde_json::Value> = s
        .session
        .draft()
        .map(|d| {
            d.iter()
                .map(|(student_id, status)| {
                    json!({
                        "studentId": student_id,
                        "name": crate::roster::find(*student_id).map(|st| st.name),
                        "status": status,
                        "statusLabel": status.label(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({
        "view": s.view,
        "selectedGroup": s.selected_group(),
        "currentDate": s.current_date,
        "currentHomework": s.current_homework,
        "pinInput": s.pin_input,
        "loginError": s.login_error,
        "draft": draft,
    })
}

/// Runs one view action and answers with the resulting view snapshot.
pub fn dispatch_action(state: &mut AppState, req: &Request, action: Action) -> serde_json::Value {
    let app = match app_mut(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match app.dispatch(action) {
        Ok(d) => {
            if d.auth_rejected {
                let e = HomeworkError::Auth;
                return err(
                    &req.id,
                    e.code(),
                    e.to_string(),
                    Some(json!({ "view": view_json(app) })),
                );
            }
            let mut result = view_json(app);
            result["committed"] = json!(d.committed);
            let warnings: Vec<HomeworkError> = d.storage_warning.into_iter().collect();
            ok_with_warnings(&req.id, result, &warnings)
        }
        Err(e) => homework_err(&req.id, &e),
    }
}
