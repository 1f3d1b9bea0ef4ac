//! Depth-first copy of a folder tree with its sharing permissions.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error};

use crate::client::DriveClient;
use crate::config::FILE_COPY_PAUSE;
use crate::error::Result;
use crate::models::DriveItem;
use crate::permissions::{self, PermissionStats};
use crate::progress::{self, Progress};

/// Counters for one copy pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub folders_created: usize,
    pub files_copied: usize,
    pub permissions_copied: usize,
    /// Folder creations, file copies, listings and permission writes that failed.
    pub failures: usize,
}

impl CopyStats {
    fn record_permissions(&mut self, stats: PermissionStats) {
        self.permissions_copied += stats.copied;
        self.failures += stats.failed;
    }
}

/// Mirrors a source folder's contents under a destination folder.
///
/// Children are visited in the order the API lists them. Every remote call
/// is awaited before the next one starts.
pub struct TreeCopier {
    client: DriveClient,
    progress: Progress,
    file_pause: Duration,
}

impl TreeCopier {
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            progress: Progress::new(),
            file_pause: FILE_COPY_PAUSE,
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Delay after each file copy; zero disables it.
    pub fn with_file_pause(mut self, pause: Duration) -> Self {
        self.file_pause = pause;
        self
    }

    /// Copy everything under `source_id` into `dest_id`.
    ///
    /// Only a failure to list `source_id` itself is returned as an error.
    /// Failures on individual items are reported, counted in the returned
    /// stats, and the walk moves on to the next sibling.
    pub async fn copy(&self, source_id: &str, dest_id: &str) -> Result<CopyStats> {
        let children = self.client.list_children(source_id).await?;
        let mut stats = CopyStats::default();
        self.copy_children(children, dest_id, 0, &mut stats).await;
        debug!(?stats, "Copy pass finished");
        Ok(stats)
    }

    fn copy_children<'a>(
        &'a self,
        children: Vec<DriveItem>,
        dest_id: &'a str,
        depth: usize,
        stats: &'a mut CopyStats,
    ) -> BoxFuture<'a, ()> {
        async move {
            for item in &children {
                if item.is_folder() {
                    self.copy_folder(item, dest_id, depth, stats).await;
                } else {
                    self.copy_file(item, dest_id, depth, stats).await;
                }
            }
        }
        .boxed()
    }

    async fn copy_folder(
        &self,
        item: &DriveItem,
        dest_id: &str,
        depth: usize,
        stats: &mut CopyStats,
    ) {
        self.progress.emit(progress::folder_line(depth, &item.name));

        let folder = match self.client.create_folder(&item.name, dest_id).await {
            Ok(folder) => folder,
            Err(e) => {
                stats.failures += 1;
                error!(
                    name = %item.name,
                    source_id = %item.id,
                    error = %e,
                    "Failed to create folder"
                );
                self.progress
                    .emit(progress::error_line(depth, "folder", &item.name, &e));
                return;
            }
        };
        stats.folders_created += 1;

        let perms =
            permissions::copy_permissions(&self.client, &self.progress, &item.id, &folder.id, depth)
                .await;
        stats.record_permissions(perms);

        match self.client.list_children(&item.id).await {
            Ok(children) => {
                self.copy_children(children, &folder.id, depth + 1, stats)
                    .await
            }
            Err(e) => {
                stats.failures += 1;
                error!(
                    name = %item.name,
                    source_id = %item.id,
                    error = %e,
                    "Failed to list folder"
                );
                self.progress
                    .emit(progress::error_line(depth, "folder", &item.name, &e));
            }
        }
    }

    async fn copy_file(
        &self,
        item: &DriveItem,
        dest_id: &str,
        depth: usize,
        stats: &mut CopyStats,
    ) {
        self.progress.emit(progress::file_line(depth, &item.name));

        let copy = match self.client.copy_file(&item.id, &item.name, dest_id).await {
            Ok(copy) => copy,
            Err(e) => {
                stats.failures += 1;
                error!(
                    name = %item.name,
                    source_id = %item.id,
                    error = %e,
                    "Failed to copy file"
                );
                self.progress
                    .emit(progress::error_line(depth, "file", &item.name, &e));
                return;
            }
        };
        stats.files_copied += 1;

        let perms =
            permissions::copy_permissions(&self.client, &self.progress, &item.id, &copy.id, depth)
                .await;
        stats.record_permissions(perms);

        if !self.file_pause.is_zero() {
            tokio::time::sleep(self.file_pause).await;
        }
    }
}
