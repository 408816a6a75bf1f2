use crate::app::{App, SystemClock};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteBlobStore;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (creating if needed) the workspace database and loads the stores.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    // Release the previous connection before opening another.
    state.app = None;
    state.workspace = None;

    let conn = db::open_db(path)?;
    let app = App::open(SqliteBlobStore::new(conn), Box::new(SystemClock))?;
    info!(
        workspace = %path.display(),
        records = app.records().len(),
        catalog = app.catalog().len(),
        "workspace opened"
    );
    state.workspace = Some(path.to_path_buf());
    state.app = Some(app);
    Ok(())
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => {
            warn!(workspace = %path.display(), error = %e, "failed to open workspace");
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

fn handle_view_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match helpers::app_ref(state, req) {
        Ok(app) => ok(&req.id, helpers::view_json(app)),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "view.get" => Some(handle_view_get(state, req)),
        _ => None,
    }
}
