use super::core::open_workspace;
use super::setup;
use crate::backup;
use crate::export::export_records;
use crate::ipc::error::{err, homework_err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_exchange_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::teacher_app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let out_path = match helpers::optional_str(req, "outPath") {
        Ok(v) => v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        Err(resp) => return resp,
    };
    let today = match helpers::today_str(req, app) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let opts = match setup::export_options(app.store()) {
        Ok(v) => v,
        Err(e) => return homework_err(&req.id, &e),
    };

    let export = match export_records(app.records(), &today, &opts) {
        Ok(Some(v)) => v,
        Ok(None) => return ok(&req.id, json!({ "exported": false, "rowCount": 0 })),
        Err(e) => return err(&req.id, "export_failed", format!("{e:#}"), None),
    };

    let Some(out_path) = out_path else {
        let text = String::from_utf8_lossy(&export.bytes).into_owned();
        return ok(
            &req.id,
            json!({
                "exported": true,
                "fileName": export.file_name,
                "rowCount": export.row_count,
                "text": text
            }),
        );
    };

    let out = PathBuf::from(&out_path);
    if let Some(parent) = out.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
    }
    if let Err(e) = std::fs::write(&out, &export.bytes) {
        return err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": out_path })),
        );
    }
    info!(path = %out_path, rows = export.row_count, "exported homework CSV");

    ok(
        &req.id,
        json!({
            "exported": true,
            "fileName": export.file_name,
            "rowCount": export.row_count,
            "path": out_path
        }),
    )
}

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = helpers::teacher_app_ref(state, req) {
        return resp;
    }
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let out = PathBuf::from(&out_path);
    let export = match backup::export_workspace_bundle(&workspace_path, &out) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            )
        }
    };
    info!(path = %out_path, sha256 = %export.sha256, "exported workspace bundle");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "dbSha256": export.sha256
        }),
    )
}

fn handle_backup_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = helpers::teacher_app_ref(state, req) {
        return resp;
    }
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    // Drop the open connection before replacing the file.
    state.app = None;

    let import = match backup::import_workspace_bundle(&src, &workspace_path) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %in_path, error = %e, "bundle import failed");
            let resp = err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": in_path })),
            );
            if let Err(reopen) = open_workspace(state, &workspace_path) {
                warn!(error = %reopen, "failed to reopen workspace after import error");
            }
            return resp;
        }
    };

    match open_workspace(state, &workspace_path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": workspace_path.to_string_lossy(),
                "bundleFormatDetected": import.bundle_format_detected
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.exportCsv" => Some(handle_exchange_export_csv(state, req)),
        "backup.exportBundle" => Some(handle_backup_export_bundle(state, req)),
        "backup.importBundle" => Some(handle_backup_import_bundle(state, req)),
        _ => None,
    }
}
