use crate::error::HomeworkError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Success whose side write failed; in-memory state is still valid.
pub fn ok_with_warnings(
    id: &str,
    result: serde_json::Value,
    warnings: &[HomeworkError],
) -> serde_json::Value {
    let mut resp = ok(id, result);
    if !warnings.is_empty() {
        resp["warnings"] = warnings
            .iter()
            .map(|w| json!({ "code": w.code(), "message": w.to_string() }))
            .collect();
    }
    resp
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn homework_err(id: &str, e: &HomeworkError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}
