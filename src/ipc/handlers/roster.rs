use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::model::HomeworkStatus;
use crate::roster;
use serde_json::json;

fn handle_roster_list(req: &Request) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = roster::GROUPS
        .iter()
        .map(|g| {
            json!({
                "group": g,
                "students": roster::in_group(*g).collect::<Vec<_>>(),
            })
        })
        .collect();
    let statuses: Vec<serde_json::Value> = HomeworkStatus::ALL
        .iter()
        .map(|s| json!({ "status": s, "label": s.label() }))
        .collect();
    ok(
        &req.id,
        json!({
            "students": roster::all(),
            "groups": groups,
            "statuses": statuses,
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.list" => Some(handle_roster_list(req)),
        _ => None,
    }
}
