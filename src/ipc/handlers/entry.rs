use crate::app::Action;
use crate::ipc::error::err;
use crate::ipc::helpers::{self, dispatch_action};
use crate::ipc::types::{AppState, Request};

fn handle_entry_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    let group = match helpers::required_i64(req, "group") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Ok(group) = u8::try_from(group) else {
        return err(&req.id, "bad_params", "group out of range", None);
    };
    dispatch_action(state, req, Action::SelectGroup(group))
}

fn handle_entry_set_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match helpers::required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match helpers::required_status(req, "status") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    dispatch_action(state, req, Action::SetStatus { student_id, status })
}

fn handle_entry_set_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    match helpers::required_str(req, "date") {
        Ok(date) => dispatch_action(state, req, Action::SetDate(date)),
        Err(resp) => resp,
    }
}

fn handle_entry_set_homework(state: &mut AppState, req: &Request) -> serde_json::Value {
    match helpers::required_str(req, "name") {
        Ok(name) => dispatch_action(state, req, Action::SetHomework(name)),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "entry.start" => Some(handle_entry_start(state, req)),
        "entry.setStatus" => Some(handle_entry_set_status(state, req)),
        "entry.setDate" => Some(handle_entry_set_date(state, req)),
        "entry.setHomework" => Some(handle_entry_set_homework(state, req)),
        "entry.submit" => Some(dispatch_action(state, req, Action::Submit)),
        "entry.abandon" | "view.home" => Some(dispatch_action(state, req, Action::GoHome)),
        _ => None,
    }
}
