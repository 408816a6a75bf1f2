mod test_support;

use serde_json::json;
use test_support::{login, request_err, request_ok, spawn_sidecar, submit_group, temp_dir};

#[test]
fn catalog_starts_with_defaults_and_supports_add_remove() {
    let workspace = temp_dir("homework-catalog");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let listed = request_ok(&mut stdin, &mut reader, "2", "catalog.list", json!({}));
    let names: Vec<&str> = listed["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|i| i["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["國語習作", "數學考卷", "英語作業"]);

    let _ = submit_group(&mut stdin, &mut reader, 1, "2025-03-10", "數學考卷", &[]);

    login(&mut stdin, &mut reader);
    let mgmt = request_ok(&mut stdin, &mut reader, "3", "catalog.open", json!({}));
    assert_eq!(mgmt["view"], "TEACHER_HOMEWORK_MGMT");

    assert_eq!(
        request_err(&mut stdin, &mut reader, "4", "catalog.add", json!({ "name": "   " })),
        "validation_failed"
    );
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "catalog.add",
        json!({ "name": "  生字簿 " }),
    );
    assert_eq!(added["item"]["name"], "生字簿");
    assert_eq!(added["items"].as_array().map(|i| i.len()), Some(4));

    // Duplicate names are allowed.
    let dup = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "catalog.add",
        json!({ "name": "生字簿" }),
    );
    assert_ne!(dup["item"]["id"], added["item"]["id"]);

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "catalog.remove",
        json!({ "id": "2" }),
    );
    assert_eq!(removed["removed"], true);
    assert_eq!(removed["items"].as_array().map(|i| i.len()), Some(4));

    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "catalog.remove",
        json!({ "id": "no-such-item" }),
    );
    assert_eq!(missing["removed"], false);

    let back = request_ok(&mut stdin, &mut reader, "9", "catalog.close", json!({}));
    assert_eq!(back["view"], "TEACHER_DASHBOARD");

    // Records keep their name snapshot after the catalog item is gone.
    let rows = request_ok(&mut stdin, &mut reader, "10", "records.list", json!({}));
    assert!(rows["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .all(|r| r["homeworkName"] == "數學考卷"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
