use crate::analytics::WarningPolicy;
use crate::error::HomeworkResult;
use crate::export::ExportOptions;
use crate::ipc::error::{err, homework_err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::store::BlobStore;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

#[derive(Clone, Copy)]
enum SetupSection {
    Analytics,
    Export,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "analytics" => Some(Self::Analytics),
            "export" => Some(Self::Export),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Analytics => "setup.analytics",
            Self::Export => "setup.export",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Analytics => {
            let policy = WarningPolicy::default();
            json!({
                "warningThreshold": policy.threshold,
                "windowDays": policy.window_days
            })
        }
        SetupSection::Export => {
            let opts = ExportOptions::default();
            json!({
                "fileNamePrefix": opts.file_name_prefix,
                "quoteFields": opts.quote_fields,
                "includeBom": opts.include_bom
            })
        }
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_bool(v: &Value, key: &str) -> Result<bool, String> {
    v.as_bool().ok_or_else(|| format!("{} must be boolean", key))
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

/// Length is counted in characters; prefixes are usually CJK.
fn parse_string_max(v: &Value, key: &str, max_chars: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.chars().count() > max_chars {
        return Err(format!("{} length must be <= {}", key, max_chars));
    }
    Ok(s.to_string())
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Analytics => match k.as_str() {
                "warningThreshold" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, 31)?));
                }
                "windowDays" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, 60)?));
                }
                _ => return Err(format!("unknown analytics field: {}", k)),
            },
            SetupSection::Export => match k.as_str() {
                "fileNamePrefix" => {
                    let s = parse_string_max(v, k, 32)?;
                    if s.is_empty() {
                        return Err("fileNamePrefix must not be empty".into());
                    }
                    if s.contains(['/', '\\']) {
                        return Err("fileNamePrefix must not contain path separators".into());
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                "quoteFields" | "includeBom" => {
                    obj.insert(k.clone(), Value::Bool(parse_bool(v, k)?));
                }
                _ => return Err(format!("unknown export field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section<S: BlobStore>(store: &S, section: SetupSection) -> HomeworkResult<Value> {
    let mut current = default_section(section);
    if let Some(saved) = store.load(section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: a bad historical value must not lock the section.
            if let Err(msg) = merge_section_patch(section, &mut current, saved_obj) {
                warn!(key = section.key(), error = %msg, "ignoring invalid saved setup");
                current = default_section(section);
            }
        }
    }
    Ok(current)
}

pub fn warning_policy<S: BlobStore>(store: &S) -> HomeworkResult<WarningPolicy> {
    let v = load_section(store, SetupSection::Analytics)?;
    let defaults = WarningPolicy::default();
    Ok(WarningPolicy {
        threshold: v
            .get("warningThreshold")
            .and_then(|n| n.as_u64())
            .map(|n| n as usize)
            .unwrap_or(defaults.threshold),
        window_days: v
            .get("windowDays")
            .and_then(|n| n.as_i64())
            .unwrap_or(defaults.window_days),
    })
}

pub fn export_options<S: BlobStore>(store: &S) -> HomeworkResult<ExportOptions> {
    let v = load_section(store, SetupSection::Export)?;
    let defaults = ExportOptions::default();
    Ok(ExportOptions {
        file_name_prefix: v
            .get("fileNamePrefix")
            .and_then(|s| s.as_str())
            .map(|s| s.to_string())
            .unwrap_or(defaults.file_name_prefix),
        quote_fields: v
            .get("quoteFields")
            .and_then(|b| b.as_bool())
            .unwrap_or(defaults.quote_fields),
        include_bom: v
            .get("includeBom")
            .and_then(|b| b.as_bool())
            .unwrap_or(defaults.include_bom),
    })
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let analytics = match load_section(app.store(), SetupSection::Analytics) {
        Ok(v) => v,
        Err(e) => return homework_err(&req.id, &e),
    };
    let export = match load_section(app.store(), SetupSection::Export) {
        Ok(v) => v,
        Err(e) => return homework_err(&req.id, &e),
    };
    ok(&req.id, json!({ "analytics": analytics, "export": export }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match helpers::app_ref(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    if let Err(e) = app.require_teacher() {
        return homework_err(&req.id, &e);
    }
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(app.store(), section) {
        Ok(v) => v,
        Err(e) => return homework_err(&req.id, &e),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = app.store().save(section.key(), &current) {
        return homework_err(&req.id, &e);
    }
    info!(section = section.key(), "setup updated");
    ok(&req.id, json!({ "section": section_raw, "value": current }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;

    #[test]
    fn defaults_apply_when_nothing_saved() {
        let store = MemoryBlobStore::new();
        assert_eq!(
            warning_policy(&store).expect("policy"),
            WarningPolicy::default()
        );
        assert_eq!(
            export_options(&store).expect("options"),
            ExportOptions::default()
        );
    }

    #[test]
    fn saved_values_override_defaults() {
        let store = MemoryBlobStore::new();
        store.insert(
            "setup.analytics",
            json!({ "warningThreshold": 2, "windowDays": 14 }),
        );
        store.insert("setup.export", json!({ "quoteFields": false }));
        let policy = warning_policy(&store).expect("policy");
        assert_eq!(policy.threshold, 2);
        assert_eq!(policy.window_days, 14);
        let opts = export_options(&store).expect("options");
        assert!(!opts.quote_fields);
        assert!(opts.include_bom);
    }

    #[test]
    fn patch_rejects_out_of_range_and_unknown_fields() {
        let mut current = default_section(SetupSection::Analytics);
        let patch = json!({ "windowDays": 0 });
        assert!(merge_section_patch(
            SetupSection::Analytics,
            &mut current,
            patch.as_object().expect("object")
        )
        .is_err());

        let mut current = default_section(SetupSection::Export);
        let patch = json!({ "delimiter": ";" });
        let e = merge_section_patch(
            SetupSection::Export,
            &mut current,
            patch.as_object().expect("object"),
        )
        .expect_err("unknown field");
        assert!(e.contains("delimiter"));
    }

    #[test]
    fn prefix_length_counts_characters() {
        let mut current = default_section(SetupSection::Export);
        let ok_patch = json!({ "fileNamePrefix": "作".repeat(32) });
        assert!(merge_section_patch(
            SetupSection::Export,
            &mut current,
            ok_patch.as_object().expect("object")
        )
        .is_ok());
        let long_patch = json!({ "fileNamePrefix": "作".repeat(33) });
        assert!(merge_section_patch(
            SetupSection::Export,
            &mut current,
            long_patch.as_object().expect("object")
        )
        .is_err());
    }

    #[test]
    fn invalid_saved_section_falls_back_to_defaults() {
        let store = MemoryBlobStore::new();
        store.insert("setup.analytics", json!({ "warningThreshold": 999 }));
        assert_eq!(
            warning_policy(&store).expect("policy"),
            WarningPolicy::default()
        );
    }
}
