use crate::analytics::{history, HistoryQuery};
use crate::ipc::error::{err, homework_err, ok, ok_with_warnings};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::teacher_app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let date = match helpers::optional_str(req, "date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_name = match helpers::optional_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let rows = history(app.records(), &HistoryQuery { date, student_name });
    ok(
        &req.id,
        json!({
            "total": app.records().len(),
            "rows": rows,
        }),
    )
}

fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match helpers::required_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if req.params.get("confirm").and_then(|v| v.as_bool()) != Some(true) {
        return err(
            &req.id,
            "bad_params",
            "records.delete requires confirm: true",
            None,
        );
    }
    let app = match helpers::app_mut(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match app.delete_record(&id) {
        Ok(removed) => ok(&req.id, json!({ "removed": removed })),
        // Already gone from memory; only the write failed.
        Err(e) if e.is_storage() => ok_with_warnings(
            &req.id,
            json!({ "removed": true }),
            std::slice::from_ref(&e),
        ),
        Err(e) => homework_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.list" => Some(handle_records_list(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        _ => None,
    }
}
