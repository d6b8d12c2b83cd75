use assert_cmd::Command;

#[test]
fn routes_prints_route_table() {
    let output = Command::cargo_bin("shelf")
        .unwrap()
        .arg("routes")
        .output()
        .unwrap();
    assert!(output.status.success());

    let routes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let routes = routes.as_array().unwrap();
    assert_eq!(routes.len(), 14);
    assert_eq!(routes[1]["path"], "/filterbooks");
    assert_eq!(routes[1]["queryParameters"].as_array().unwrap().len(), 7);
}

#[test]
fn config_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::cargo_bin("shelf")
        .unwrap()
        .arg("config")
        .env("SHELF_CONFIG_DIR", dir.path())
        .env("SHELF_ENV", "local")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["books"]["max_results"], 100);
}

#[test]
fn unknown_environment_fails() {
    Command::cargo_bin("shelf")
        .unwrap()
        .arg("config")
        .env("SHELF_ENV", "moon")
        .assert()
        .failure();
}
