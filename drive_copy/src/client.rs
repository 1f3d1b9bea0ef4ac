//! Google Drive API client covering the calls a folder copy needs.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Authenticator;
use crate::config::{DRIVE_API_BASE, FOLDER_MIME, LIST_PAGE_SIZE, PERMISSION_PAGE_SIZE};
use crate::error::{DriveError, Result};
use crate::models::{
    ApiErrorResponse, DriveItem, FileListResponse, NewPermission, Permission,
    PermissionListResponse,
};

/// Fields requested for single-item responses.
const ITEM_FIELDS: &str = "id, name, mimeType";

/// Client for the Drive v3 files and permissions endpoints.
///
/// Every call sets `supportsAllDrives=true` so source and destination may
/// live in a Shared Drive.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient against the public Drive API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against a different API root (e.g. a mock server).
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List the non-trashed direct children of a folder, following every page.
    pub async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveItem>> {
        let query = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.auth.get_access_token().await?;
            let mut request = self
                .http
                .get(format!("{}/files", self.base_url))
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                    ("pageSize", LIST_PAGE_SIZE),
                    ("fields", "nextPageToken, files(id, name, mimeType)"),
                ]);

            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let page: FileListResponse = send_json(request).await?;
            debug!(folder_id, count = page.files.len(), "Listed folder page");
            items.extend(page.files);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(items)
    }

    /// Create a folder named `name` inside `parent_id`.
    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveItem> {
        let token = self.auth.get_access_token().await?;
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id]
        });

        let request = self
            .http
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", ITEM_FIELDS)])
            .json(&metadata);

        let folder: DriveItem = send_json(request).await?;
        debug!(name, parent_id, id = %folder.id, "Created folder");
        Ok(folder)
    }

    /// Server-side copy of `file_id` into `parent_id` under `name`.
    pub async fn copy_file(&self, file_id: &str, name: &str, parent_id: &str) -> Result<DriveItem> {
        let token = self.auth.get_access_token().await?;
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id]
        });

        let request = self
            .http
            .post(format!("{}/files/{}/copy", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", ITEM_FIELDS)])
            .json(&metadata);

        let copy: DriveItem = send_json(request).await?;
        debug!(file_id, name, parent_id, id = %copy.id, "Copied file");
        Ok(copy)
    }

    /// List every permission on an item, following every page.
    pub async fn list_permissions(&self, item_id: &str) -> Result<Vec<Permission>> {
        let mut permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.auth.get_access_token().await?;
            let mut request = self
                .http
                .get(format!("{}/files/{}/permissions", self.base_url, item_id))
                .bearer_auth(&token)
                .query(&[
                    ("supportsAllDrives", "true"),
                    ("pageSize", PERMISSION_PAGE_SIZE),
                    (
                        "fields",
                        "nextPageToken, permissions(id, type, role, emailAddress, domain)",
                    ),
                ]);

            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let page: PermissionListResponse = send_json(request).await?;
            permissions.extend(page.permissions);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(item_id, count = permissions.len(), "Listed permissions");
        Ok(permissions)
    }

    /// Create a permission on `item_id` without emailing the grantee.
    pub async fn create_permission(&self, item_id: &str, permission: &NewPermission) -> Result<()> {
        let token = self.auth.get_access_token().await?;

        let request = self
            .http
            .post(format!("{}/files/{}/permissions", self.base_url, item_id))
            .bearer_auth(&token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("sendNotificationEmail", "false"),
                ("fields", "id"),
            ])
            .json(permission);

        check_status(request.send().await?).await?;
        debug!(item_id, grantee = %permission, "Created permission");
        Ok(())
    }
}

/// Escape a value embedded in a Drive query string literal.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = check_status(request.send().await?).await?;
    Ok(response.json().await?)
}

/// Turn a non-2xx response into [`DriveError::ApiError`], preferring the
/// message from Google's error body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}
