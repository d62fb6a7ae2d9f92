#![allow(dead_code)]

use std::net::TcpListener;

use actix_web::{web, App, HttpServer};
use lead_intake::config::Config;
use lead_intake::{routes, AppState};

/// Storage settings that presign locally without touching AWS.
pub fn storage_config() -> Config {
    Config {
        s3_bucket: Some("reels".to_string()),
        s3_region: Some("eu-west-1".to_string()),
        aws_access_key_id: Some("AKIDEXAMPLE".to_string()),
        aws_secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        ..Config::default()
    }
}

pub fn webhook_config(webhook_url: String) -> Config {
    Config {
        webhook_url: Some(webhook_url),
        ..Config::default()
    }
}

/// Runs the real server on an ephemeral port and returns its base URL.
pub fn spawn_app(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind ephemeral port");
    let port = listener.local_addr().expect("no local address").port();
    let state = web::Data::new(AppState::new(config));

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .listen(listener)
        .expect("failed to listen")
        .workers(1)
        .run();
    tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}
