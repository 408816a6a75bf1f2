mod test_support;

use serde_json::json;
use test_support::{login, request_err, request_ok, spawn_sidecar, submit_group, temp_dir};

#[test]
fn group_visit_commits_one_record_per_member_and_returns_home() {
    let workspace = temp_dir("homework-entry-flow");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let initial = request_ok(&mut stdin, &mut reader, "2", "view.get", json!({}));
    assert_eq!(initial["view"], "HOME");
    assert_eq!(initial["currentHomework"], "國語習作");
    assert!(initial["selectedGroup"].is_null());

    let started = request_ok(&mut stdin, &mut reader, "3", "entry.start", json!({ "group": 3 }));
    assert_eq!(started["view"], "GROUP_ENTRY");
    assert_eq!(started["selectedGroup"], 3);
    let draft = started["draft"].as_array().expect("draft");
    assert_eq!(draft.len(), 6);
    assert!(draft.iter().all(|d| d["status"] == "submitted"));

    let committed = submit_group(
        &mut stdin,
        &mut reader,
        3,
        "2025-03-10",
        "數學考卷",
        &[(22, "missing"), (13, "needs_correction")],
    );
    assert_eq!(committed["committed"], 6);
    assert_eq!(committed["view"], "HOME");
    assert!(committed["selectedGroup"].is_null());
    assert!(committed.get("warnings").is_none());

    login(&mut stdin, &mut reader);
    let listed = request_ok(&mut stdin, &mut reader, "4", "records.list", json!({}));
    let rows = listed["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r["homeworkName"] == "數學考卷"));
    assert!(rows.iter().all(|r| r["date"] == "2025-03-10"));
    let missing: Vec<_> = rows.iter().filter(|r| r["status"] == "missing").collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["studentId"], 22);
    assert_eq!(missing[0]["statusLabel"], "缺交");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn entry_rejects_unknown_groups_foreign_students_and_bad_dates() {
    let workspace = temp_dir("homework-entry-errors");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    assert_eq!(
        request_err(&mut stdin, &mut reader, "2", "entry.start", json!({ "group": 9 })),
        "validation_failed"
    );
    assert_eq!(
        request_err(&mut stdin, &mut reader, "3", "entry.submit", json!({})),
        "invalid_state"
    );

    // Group 6 exists but has no members.
    let empty = request_ok(&mut stdin, &mut reader, "4", "entry.start", json!({ "group": 6 }));
    assert_eq!(empty["draft"].as_array().map(|d| d.len()), Some(0));

    let _ = request_ok(&mut stdin, &mut reader, "5", "entry.start", json!({ "group": 1 }));
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "6",
            "entry.setStatus",
            json!({ "studentId": 9, "status": "missing" }),
        ),
        "validation_failed"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "7",
            "entry.setStatus",
            json!({ "studentId": 12, "status": "lost" }),
        ),
        "bad_params"
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "entry.setDate",
        json!({ "date": "10/03/2025" }),
    );
    assert_eq!(
        request_err(&mut stdin, &mut reader, "9", "entry.submit", json!({})),
        "validation_failed"
    );
    let still = request_ok(&mut stdin, &mut reader, "10", "view.get", json!({}));
    assert_eq!(still["view"], "GROUP_ENTRY");
    assert_eq!(still["draft"].as_array().map(|d| d.len()), Some(5));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn committed_records_survive_a_restart() {
    let workspace = temp_dir("homework-entry-persist");
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
        let _ = submit_group(&mut stdin, &mut reader, 5, "2025-03-11", "英語作業", &[]);
        drop(stdin);
        let _ = child.wait();
    }

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    login(&mut stdin, &mut reader);
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.list",
        json!({ "date": "2025-03-11" }),
    );
    assert_eq!(listed["rows"].as_array().map(|r| r.len()), Some(5));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn whitespace_homework_name_blocks_submit_and_writes_nothing() {
    let workspace = temp_dir("homework-entry-blank-name");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let _ = request_ok(&mut stdin, &mut reader, "2", "entry.start", json!({ "group": 1 }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "entry.setDate",
        json!({ "date": "2025-03-10" }),
    );
    let named = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "entry.setHomework",
        json!({ "name": "   " }),
    );
    assert_eq!(named["currentHomework"], "   ");
    assert_eq!(
        request_err(&mut stdin, &mut reader, "5", "entry.submit", json!({})),
        "validation_failed"
    );

    let still = request_ok(&mut stdin, &mut reader, "6", "view.get", json!({}));
    assert_eq!(still["view"], "GROUP_ENTRY");
    assert_eq!(still["selectedGroup"], 1);
    assert_eq!(still["draft"].as_array().map(|d| d.len()), Some(5));

    // A cleared field falls back to the first catalog item.
    let cleared = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "entry.setHomework",
        json!({ "name": "" }),
    );
    assert_eq!(cleared["currentHomework"], "國語習作");

    let _ = request_ok(&mut stdin, &mut reader, "8", "view.home", json!({}));
    login(&mut stdin, &mut reader);
    let listed = request_ok(&mut stdin, &mut reader, "9", "records.list", json!({}));
    assert_eq!(listed["total"], 0);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
