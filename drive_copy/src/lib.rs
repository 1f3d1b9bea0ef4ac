//! drive_copy - Copy a Google Drive folder tree, sharing included.
//!
//! This library provides:
//! - OAuth2 installed-app authentication with a persisted token file
//! - A small Drive v3 client (list, create folder, copy file, permissions)
//! - A depth-first tree copier that replays non-owner sharing grants
//!
//! Works across Shared Drive boundaries. Each run is a single forward pass;
//! running it twice creates a second copy.
//!
//! # Example
//!
//! ```no_run
//! use drive_copy::{Authenticator, DriveClient, TokenStore, TreeCopier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = TokenStore::new("token.json");
//!     let auth = Authenticator::authenticate("client_secrets.json", store).await?;
//!     let copier = TreeCopier::new(DriveClient::new(auth));
//!
//!     copier.copy("source-folder-id", "destination-folder-id").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod callback;
pub mod client;
pub mod config;
pub mod copier;
pub mod error;
pub mod models;
pub mod permissions;
pub mod progress;
pub mod token_store;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::DriveClient;
pub use copier::{CopyStats, TreeCopier};
pub use error::{DriveError, Result};
pub use models::{DriveItem, Permission};
pub use token_store::{Credential, TokenStore};
pub use url_parser::extract_folder_id;
