use crate::app::Action;
use crate::ipc::error::{homework_err, ok, ok_with_warnings};
use crate::ipc::helpers::{self, dispatch_action};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::info;

fn handle_catalog_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match helpers::app_ref(state, req) {
        Ok(app) => ok(&req.id, json!({ "items": app.catalog() })),
        Err(resp) => resp,
    }
}

fn handle_catalog_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match helpers::required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let app = match helpers::app_mut(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match app.add_catalog_item(&name) {
        Ok(item) => {
            info!(id = %item.id, name = %item.name, "catalog item added");
            ok(&req.id, json!({ "item": item, "items": app.catalog() }))
        }
        // The item is kept in memory; only the write failed.
        Err(e) if e.is_storage() => ok_with_warnings(
            &req.id,
            json!({ "item": app.catalog().last(), "items": app.catalog() }),
            std::slice::from_ref(&e),
        ),
        Err(e) => homework_err(&req.id, &e),
    }
}

fn handle_catalog_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match helpers::required_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let app = match helpers::app_mut(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match app.remove_catalog_item(&id) {
        Ok(removed) => ok(&req.id, json!({ "removed": removed, "items": app.catalog() })),
        Err(e) if e.is_storage() => ok_with_warnings(
            &req.id,
            json!({ "removed": true, "items": app.catalog() }),
            std::slice::from_ref(&e),
        ),
        Err(e) => homework_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "catalog.list" => Some(handle_catalog_list(state, req)),
        "catalog.add" => Some(handle_catalog_add(state, req)),
        "catalog.remove" => Some(handle_catalog_remove(state, req)),
        "catalog.open" => Some(dispatch_action(state, req, Action::OpenHomeworkMgmt)),
        "catalog.close" => Some(dispatch_action(state, req, Action::BackToDashboard)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, SystemClock};
    use crate::db;
    use crate::store::SqliteBlobStore;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn request(method: &str, params: serde_json::Value) -> Request {
        Request {
            id: "1".to_string(),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn add_reports_the_item_when_the_write_fails() {
        let workspace = temp_dir("homework-catalog-add-warning");
        let conn = db::open_db(&workspace).expect("open db");
        let mut app = App::open(SqliteBlobStore::new(conn), Box::new(SystemClock)).expect("app");
        app.dispatch(Action::OpenLogin).expect("open login");
        app.dispatch(Action::EnterPin("1234".into())).expect("pin");
        app.dispatch(Action::SubmitPin).expect("submit pin");
        let mut state = AppState {
            workspace: Some(workspace.clone()),
            app: Some(app),
        };

        // A second connection removes the table out from under the store.
        let other = db::open_db(&workspace).expect("second connection");
        other
            .execute_batch("DROP TABLE kv_store")
            .expect("drop table");

        let resp = try_handle(&mut state, &request("catalog.add", json!({ "name": "日記" })))
            .expect("handled");
        assert_eq!(resp["ok"], true);
        assert_eq!(resp["warnings"][0]["code"], "storage_failed");
        let item = &resp["result"]["item"];
        assert_eq!(item["name"], "日記");
        assert!(item["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(resp["result"]["items"].as_array().map(|i| i.len()), Some(4));

        drop(state);
        let _ = std::fs::remove_dir_all(workspace);
    }
}
