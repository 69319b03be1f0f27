use serde_json::json;

use crate::common::{DOWN_ID, MIRROR_ID, ORIGIN_ID, TestApp, routes};

#[tokio::test]
async fn create_version() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(routes::VERSIONS, &json!({"name": "1.2.0", "channel": "beta"}))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["name"], "1.2.0");
    assert_eq!(res.body["channel"], "beta");

    let res = app
        .post_json(routes::VERSIONS, &json!({"name": "1.3.0"}))
        .await;
    assert_eq!(res.body["channel"], "stable");
}

#[tokio::test]
async fn duplicate_version_conflicts() {
    let app = TestApp::spawn().await;
    app.post_json(routes::VERSIONS, &json!({"name": "1.0.0"}))
        .await;

    let res = app
        .post_json(routes::VERSIONS, &json!({"name": "1.0.0"}))
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");
}

#[tokio::test]
async fn invalid_version_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(routes::VERSIONS, &json!({"name": "one.two"}))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app.post_json(routes::VERSIONS, &json!({"title": "x"})).await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn list_is_semver_ordered() {
    let app = TestApp::spawn().await;
    for name in ["1.10.0", "1.9.0", "v1.2.0", "2.0.0-rc.1"] {
        let res = app.post_json(routes::VERSIONS, &json!({"name": name})).await;
        assert_eq!(res.status, 201);
    }

    let res = app.get(routes::VERSIONS).await;
    let names: Vec<&str> = res.body["versions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["2.0.0-rc.1", "1.10.0", "1.9.0", "v1.2.0"]);
    assert_eq!(res.body["total"], 4);
}

#[tokio::test]
async fn version_assets_include_every_node() {
    let app = TestApp::spawn().await;
    app.upload_ok("MyApp.exe", b"exe", "1.0.0", "win32").await;

    let res = app.get(&routes::version_assets("1.0.0")).await;
    assert_eq!(res.status, 200);
    let mut owners: Vec<i64> = res.body["assets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["cache_id"].as_i64().unwrap())
        .collect();
    owners.sort();
    assert_eq!(owners, vec![ORIGIN_ID as i64, MIRROR_ID as i64]);

    let res = app.get(&routes::version_assets("9.9.9")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn caches_hide_credentials() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::CACHES).await;
    assert_eq!(res.status, 200);
    let caches = res.body["caches"].as_array().unwrap();
    let ids: Vec<i64> = caches.iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![ORIGIN_ID as i64, MIRROR_ID as i64, DOWN_ID as i64]);
    assert_eq!(caches[0]["is_default"], true);
    assert!(!res.text.contains("secret"));
    assert!(caches.iter().all(|c| c.get("ftp_password").is_none()));
}
