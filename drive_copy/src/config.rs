//! Fixed configuration values shared by the copier components.

use std::time::Duration;

/// MIME type Google Drive uses for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Full read/write scope over the operator's Drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// OAuth2 consent endpoint, used when the secrets file omits `auth_uri`.
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// OAuth2 token endpoint, used when the secrets file omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const DEFAULT_CLIENT_SECRETS: &str = "client_secrets.json";

pub const DEFAULT_TOKEN_FILE: &str = "token.json";

/// Environment variable overriding the token file location.
pub const TOKEN_FILE_ENV: &str = "DRIVE_COPY_TOKEN_FILE";

/// Pause after every file copy.
pub const FILE_COPY_PAUSE: Duration = Duration::from_millis(100);

/// Access tokens this close to expiry are treated as expired.
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits or garbles `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Page size requested from list endpoints.
pub const LIST_PAGE_SIZE: &str = "1000";

/// Page size requested from the permissions list endpoint (API maximum).
pub const PERMISSION_PAGE_SIZE: &str = "100";
