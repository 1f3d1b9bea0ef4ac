//! Shared fixtures for tests that run against a mocked Drive API.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use tempfile::TempDir;

use drive_copy::config::FOLDER_MIME;
use drive_copy::models::ClientSecrets;
use drive_copy::{Authenticator, Credential, DriveClient, TokenStore};

pub const ACCESS_TOKEN: &str = "ya29.test-token";

pub fn secrets_for(server: &ServerGuard) -> ClientSecrets {
    ClientSecrets {
        client_id: "client-123.apps.googleusercontent.com".to_string(),
        client_secret: "shh".to_string(),
        auth_uri: None,
        token_uri: Some(format!("{}/token", server.url())),
    }
}

pub fn valid_credential() -> Credential {
    Credential {
        access_token: ACCESS_TOKEN.to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
        scope: None,
    }
}

/// A client pointed at `server`, holding a valid token. The returned
/// directory backs the token store and must outlive the client.
pub fn client_for(server: &ServerGuard) -> (DriveClient, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let auth =
        Authenticator::with_credential(secrets_for(server), store, valid_credential()).unwrap();
    (DriveClient::with_base_url(auth, server.url()), dir)
}

pub fn folder(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "mimeType": FOLDER_MIME})
}

pub fn file(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "mimeType": "text/plain"})
}

pub fn children_query(folder_id: &str) -> Matcher {
    Matcher::UrlEncoded(
        "q".to_string(),
        format!("'{}' in parents and trashed = false", folder_id),
    )
}

pub async fn mock_children(server: &mut ServerGuard, folder_id: &str, items: Vec<Value>) -> Mock {
    server
        .mock("GET", "/files")
        .match_query(children_query(folder_id))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "files": items }).to_string())
        .expect(1)
        .create_async()
        .await
}

pub async fn mock_create_folder(
    server: &mut ServerGuard,
    name: &str,
    parent_id: &str,
    new_id: &str,
) -> Mock {
    server
        .mock("POST", "/files")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(folder(new_id, name).to_string())
        .expect(1)
        .create_async()
        .await
}

pub async fn mock_copy_file(
    server: &mut ServerGuard,
    file_id: &str,
    name: &str,
    parent_id: &str,
    new_id: &str,
) -> Mock {
    server
        .mock("POST", format!("/files/{}/copy", file_id).as_str())
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "name": name,
            "parents": [parent_id]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(file(new_id, name).to_string())
        .expect(1)
        .create_async()
        .await
}

pub async fn mock_permissions(
    server: &mut ServerGuard,
    item_id: &str,
    permissions: Vec<Value>,
) -> Mock {
    server
        .mock("GET", format!("/files/{}/permissions", item_id).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "permissions": permissions }).to_string())
        .expect(1)
        .create_async()
        .await
}

/// Expect one permissions.create on `item_id` whose body contains `body`.
pub async fn mock_create_permission(
    server: &mut ServerGuard,
    item_id: &str,
    body: Value,
    status: usize,
) -> Mock {
    let response = if status < 300 {
        json!({"id": "newperm"})
    } else {
        json!({"error": {"code": status, "message": "Permission denied by test"}})
    };

    server
        .mock("POST", format!("/files/{}/permissions", item_id).as_str())
        .match_query(Matcher::UrlEncoded(
            "sendNotificationEmail".to_string(),
            "false".to_string(),
        ))
        .match_body(Matcher::PartialJson(body))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(response.to_string())
        .expect(1)
        .create_async()
        .await
}

pub fn owner(email: &str) -> Value {
    json!({"id": "owner", "type": "user", "role": "owner", "emailAddress": email})
}

pub fn user(email: &str, role: &str) -> Value {
    json!({"id": format!("u-{}", email), "type": "user", "role": role, "emailAddress": email})
}

pub fn domain(domain: &str, role: &str) -> Value {
    json!({"id": format!("d-{}", domain), "type": "domain", "role": role, "domain": domain})
}

pub fn anyone(role: &str) -> Value {
    json!({"id": "anyoneWithLink", "type": "anyone", "role": role})
}
