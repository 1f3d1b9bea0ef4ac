//! Replays sharing grants from a source item onto its copy.

use tracing::{error, warn};

use crate::client::DriveClient;
use crate::models::{GranteeType, NewPermission, Permission, Role};
use crate::progress::{self, Progress};

/// Outcome of replaying one item's permissions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PermissionStats {
    pub copied: usize,
    pub failed: usize,
}

/// Build the request body that re-creates `permission`, or `None` if the
/// grant must not be replayed.
///
/// Owner grants are never transferable, and only user, group and domain
/// grants are carried over; link-sharing (`anyone`) grants are dropped.
pub fn replayable(permission: &Permission) -> Option<NewPermission> {
    if matches!(permission.role, Role::Owner | Role::Unknown) {
        return None;
    }

    match permission.grantee_type {
        GranteeType::User | GranteeType::Group => {
            let email = permission.email_address.clone()?;
            Some(NewPermission {
                grantee_type: permission.grantee_type,
                role: permission.role,
                email_address: Some(email),
                domain: None,
            })
        }
        GranteeType::Domain => {
            let domain = permission.domain.clone()?;
            Some(NewPermission {
                grantee_type: GranteeType::Domain,
                role: permission.role,
                email_address: None,
                domain: Some(domain),
            })
        }
        GranteeType::Anyone | GranteeType::Unknown => None,
    }
}

/// Copy the replayable permissions of `source_id` onto `dest_id`.
///
/// Best effort: a failed listing replays nothing, and a failed create is
/// reported and the next grant is attempted.
pub async fn copy_permissions(
    client: &DriveClient,
    progress: &Progress,
    source_id: &str,
    dest_id: &str,
    depth: usize,
) -> PermissionStats {
    let mut stats = PermissionStats::default();

    let permissions = match client.list_permissions(source_id).await {
        Ok(permissions) => permissions,
        Err(e) => {
            error!(source_id, error = %e, "Failed to list permissions");
            progress.emit(progress::permission_list_failed_line(depth, &e));
            stats.failed += 1;
            return stats;
        }
    };

    for permission in &permissions {
        let Some(body) = replayable(permission) else {
            if is_grant_without_target(permission) {
                warn!(
                    source_id,
                    grantee_type = ?permission.grantee_type,
                    "Skipping grant without email or domain"
                );
            }
            continue;
        };

        match client.create_permission(dest_id, &body).await {
            Ok(()) => {
                stats.copied += 1;
                progress.emit(progress::permission_line(depth, permission.grantee()));
            }
            Err(e) => {
                stats.failed += 1;
                warn!(
                    dest_id,
                    grantee = permission.grantee(),
                    error = %e,
                    "Failed to copy permission"
                );
                progress.emit(progress::permission_failed_line(
                    depth,
                    permission.grantee(),
                    &e,
                ));
            }
        }
    }

    stats
}

/// A replayable kind of grant that is missing its email or domain.
fn is_grant_without_target(permission: &Permission) -> bool {
    if matches!(permission.role, Role::Owner | Role::Unknown) {
        return false;
    }
    match permission.grantee_type {
        GranteeType::User | GranteeType::Group => permission.email_address.is_none(),
        GranteeType::Domain => permission.domain.is_none(),
        GranteeType::Anyone | GranteeType::Unknown => false,
    }
}
