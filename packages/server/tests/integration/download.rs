use reqwest::multipart::Form;

use crate::common::{MIRROR_CLIENT, MIRROR_ID, MIRROR_URL, TestApp, file_part};

const SQUIRREL: (&str, &str) = ("user-agent", "Squirrel/1.0");

mod stream {
    use super::*;

    #[tokio::test]
    async fn default_node_streams_file_and_counts() {
        let app = TestApp::spawn().await;
        let asset = app
            .upload_ok("MyApp Setup.exe", b"installer-bytes", "1.0.0", "win32")
            .await;

        let res = app.download("/download/latest/win32", &[]).await;
        assert_eq!(res.status(), 200);
        let headers = res.headers().clone();
        assert_eq!(
            headers["content-disposition"],
            "attachment; filename=\"MyApp Setup.exe\""
        );
        assert_eq!(headers["content-length"], "15");
        assert!(headers.contains_key("content-type"));
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"installer-bytes");

        let id = asset["id"].as_str().unwrap();
        assert_eq!(app.wait_for_download_count(id, 1).await, 1);
    }

    #[tokio::test]
    async fn missing_local_file_is_a_server_error() {
        let app = TestApp::spawn().await;
        let asset = app.upload_ok("MyApp.exe", b"exe", "1.0.0", "win32").await;
        std::fs::remove_file(app.storage_root().join(asset["fd"].as_str().unwrap())).unwrap();

        let res = app.download("/download/1.0.0/win32", &[]).await;
        assert_eq!(res.status(), 500);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "LOCAL_IO_ERROR");
    }
}

mod redirect {
    use super::*;

    #[tokio::test]
    async fn mapped_client_is_redirected_to_its_node() {
        let app = TestApp::spawn().await;
        let res = app.upload("MyApp.exe", b"exe", "1.0.0", "win32").await;
        assert_eq!(res.status, 201);
        let fd = res.body["asset"]["fd"].as_str().unwrap();
        let replica_id = res.body["replicas"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["cache_id"] == MIRROR_ID)
            .and_then(|r| r["asset_id"].as_str())
            .unwrap()
            .to_string();

        let forwarded = format!("{MIRROR_CLIENT}, 10.0.0.1");
        let res = app
            .download(
                "/download/latest/win32-x64",
                &[("x-forwarded-for", forwarded.as_str())],
            )
            .await;
        assert_eq!(res.status(), 302);
        assert_eq!(res.headers()["location"], format!("{MIRROR_URL}/{fd}").as_str());
        assert_eq!(app.wait_for_download_count(&replica_id, 1).await, 1);
    }

    #[tokio::test]
    async fn mapped_client_without_replica_gets_not_found() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .text("version", "1.0.0")
            .text("platform", "linux")
            .part("file", file_part("app.deb", b"deb"));
        let res = app.upload_form(form).await;
        assert_eq!(res.status, 201);
        let replica_id = res.body["replicas"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["cache_id"] == MIRROR_ID)
            .and_then(|r| r["asset_id"].as_str())
            .unwrap()
            .to_string();
        // Leave the origin as the only copy.
        assert_eq!(
            app.delete(&crate::common::routes::asset(&replica_id))
                .await
                .status,
            200
        );

        let res = app
            .download("/download/latest/linux", &[("x-forwarded-for", MIRROR_CLIENT)])
            .await;
        assert_eq!(res.status(), 404);
    }
}

mod selection {
    use super::*;

    #[tokio::test]
    async fn filename_and_filetype_pick_the_package() {
        let app = TestApp::spawn().await;
        app.upload_ok("MyApp.exe", b"exe", "1.0.0", "win32").await;
        app.upload_ok("MyApp-1.0.0-full.nupkg", b"nupkg", "1.0.0", "win32")
            .await;

        let res = app.download("/download/1.0.0/win32", &[]).await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"exe");

        let res = app
            .download("/download/1.0.0/win32/MyApp-x64.nupkg", &[])
            .await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"nupkg");

        let res = app.download("/download/1.0.0/win32?filetype=nupkg", &[]).await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"nupkg");

        let res = app.download("/download/1.0.0/win32/RELEASES", &[]).await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"exe");
    }

    #[tokio::test]
    async fn channel_routes_and_stable_default() {
        let app = TestApp::spawn().await;
        app.upload_ok("stable.exe", b"stable", "1.0.0", "win32").await;
        let form = Form::new()
            .text("version", "1.1.0-beta.1")
            .text("channel", "beta")
            .text("platform", "win32")
            .part("file", file_part("beta.exe", b"beta"));
        assert_eq!(app.upload_form(form).await.status, 201);

        let res = app.download("/download/channel/beta/win32", &[]).await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"beta");

        let res = app.download("/download/latest/win32", &[]).await;
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"stable");
    }

    #[tokio::test]
    async fn platform_detected_from_user_agent() {
        let app = TestApp::spawn().await;
        app.upload_ok("MyApp.exe", b"exe", "1.0.0", "win32").await;

        let res = app.download("/download/latest", &[SQUIRREL]).await;
        assert_eq!(res.status(), 200);

        let res = app
            .download("/download/latest", &[("user-agent", "curl/8.4.0")])
            .await;
        assert_eq!(res.status(), 400);
    }

    #[tokio::test]
    async fn unknown_platform_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.download("/download/latest/amiga", &[]).await;
        assert_eq!(res.status(), 400);
    }

    #[tokio::test]
    async fn nothing_matching_is_described() {
        let app = TestApp::spawn().await;
        app.upload_ok("MyApp.exe", b"exe", "1.0.0", "win32").await;

        let res = app.download("/download/2.0.0/osx", &[]).await;
        assert_eq!(res.status(), 404);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(
            body["message"],
            "No download available for platform osx for version 2.0.0"
        );
    }
}
