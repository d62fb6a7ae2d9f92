use actix_web::{test, web, App};
use serde_json::{json, Value};

use lead_intake::config::Config;
use lead_intake::{routes, AppState};

mod common;
use common::storage_config;

async fn post_json(config: Config, body: Value) -> (u16, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::new(config)))
            .configure(routes),
    )
    .await;
    let request = test::TestRequest::post()
        .uri("/upload-url")
        .set_json(body)
        .to_request();
    let response = test::call_service(&app, request).await;
    let status = response.status().as_u16();
    (status, test::read_body_json(response).await)
}

fn files(names: &[&str]) -> Value {
    let files: Vec<Value> = names
        .iter()
        .map(|name| json!({ "name": name, "type": "image/jpeg", "size": 1024 }))
        .collect();
    json!({ "files": files })
}

#[actix_web::test]
async fn test_missing_storage_is_a_server_error() {
    let (status, body) = post_json(Config::default(), files(&["a.jpg"])).await;
    assert_eq!(status, 500);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Server not configured.");
}

#[actix_web::test]
async fn test_grants_are_returned_in_request_order() {
    let (status, body) = post_json(storage_config(), files(&["lobby.jpg", "spa.jpg"])).await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);

    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert!(results[0]["key"].as_str().unwrap().ends_with("-lobby.jpg"));
    assert!(results[1]["key"].as_str().unwrap().ends_with("-spa.jpg"));

    for result in results {
        let key = result["key"].as_str().unwrap();
        assert!(key.starts_with("uploads/"));
        assert!(result["putUrl"].as_str().unwrap().contains("X-Amz-Expires=300"));
        assert!(result["getUrl"].as_str().unwrap().contains("X-Amz-Expires=3600"));
        assert_eq!(
            result["publicUrl"],
            format!("https://reels.s3.eu-west-1.amazonaws.com/{}", key)
        );
    }
}

#[actix_web::test]
async fn test_same_filename_gets_distinct_keys() {
    let (status, body) = post_json(storage_config(), files(&["a.jpg", "a.jpg"])).await;
    assert_eq!(status, 200);
    assert_ne!(body["results"][0]["key"], body["results"][1]["key"]);
}

#[actix_web::test]
async fn test_expiry_overrides_are_honored() {
    let mut request = files(&["a.jpg"]);
    request["putExpiresIn"] = json!(600);
    request["getExpiresIn"] = json!(7200);

    let (status, body) = post_json(storage_config(), request).await;
    assert_eq!(status, 200);
    assert!(body["results"][0]["putUrl"]
        .as_str()
        .unwrap()
        .contains("X-Amz-Expires=600"));
    assert!(body["results"][0]["getUrl"]
        .as_str()
        .unwrap()
        .contains("X-Amz-Expires=7200"));
}

#[actix_web::test]
async fn test_unsafe_names_are_sanitized() {
    let (status, body) = post_json(storage_config(), files(&["../../secret file.jpg"])).await;
    assert_eq!(status, 200);
    let key = body["results"][0]["key"].as_str().unwrap();
    assert!(!key.contains(".."));
    assert!(key.ends_with("-secret-file.jpg"));
}

#[actix_web::test]
async fn test_single_file_shape_is_supported() {
    let (status, body) = post_json(
        storage_config(),
        json!({ "filename": "pool.png", "contentType": "image/png" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_batch_limits_are_enforced() {
    let names: Vec<String> = (0..21).map(|i| format!("{}.jpg", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let (status, body) = post_json(storage_config(), files(&names)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Too many files: at most 20 are allowed.");

    let (status, body) = post_json(storage_config(), json!({ "files": [] })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "At least one file is required.");

    let (status, _) = post_json(
        storage_config(),
        json!({ "files": [{ "name": "menu.pdf", "type": "application/pdf" }] }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = post_json(
        storage_config(),
        json!({ "files": [{ "name": "empty.jpg", "type": "image/jpeg", "size": 0 }] }),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_malformed_body_keeps_error_shape() {
    let (status, body) = post_json(storage_config(), json!({ "unexpected": true })).await;
    assert_eq!(status, 400);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
}
