//! Executes a sync plan against the remote collaborators.
//!
//! Stages run in a fixed order: avatar upload, profile upsert, link delete,
//! link upsert. An avatar failure is recorded and the save carries on with the
//! previously persisted avatar; any other failure stops the run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::plan::SyncPlan;
use crate::context::ServiceContext;
use crate::error::{HubError, PortError, RemoteStage};
use crate::model::{Avatar, Profile, UserId};

/// A stage that stopped the save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    /// The stage that failed.
    pub stage: RemoteStage,
    /// The collaborator's error message.
    pub message: String,
}

/// Outcome of running a [`SyncPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Stages that ran and succeeded, in execution order.
    pub completed: Vec<RemoteStage>,
    /// Set when the avatar upload failed; the save went on without it.
    pub avatar_failure: Option<String>,
    /// Set when a profile or link stage failed; later stages did not run.
    pub failure: Option<StageFailure>,
    /// The profile as written, once the profile stage succeeded.
    pub persisted_profile: Option<Profile>,
    /// Number of links deleted.
    pub deleted: usize,
    /// Number of links upserted.
    pub upserted: usize,
}

impl SyncReport {
    /// Every attempted stage succeeded, avatar included.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.avatar_failure.is_none()
    }

    /// Profile and links reached the store, whatever happened to the avatar.
    #[must_use]
    pub fn records_persisted(&self) -> bool {
        self.failure.is_none() && self.persisted_profile.is_some()
    }

    /// The failure to surface to the user, fatal stages first.
    #[must_use]
    pub fn error(&self) -> Option<HubError> {
        if let Some(failure) = &self.failure {
            return Some(HubError::Remote { stage: failure.stage, message: failure.message.clone() });
        }
        self.avatar_failure.as_ref().map(|message| HubError::Remote {
            stage: RemoteStage::AvatarUpload,
            message: message.clone(),
        })
    }

    fn fail(&mut self, stage: RemoteStage, err: &PortError) {
        warn!(%stage, error = %err, "sync stage failed");
        self.failure = Some(StageFailure { stage, message: err.to_string() });
    }
}

/// Runs `plan` for `user_id`.
///
/// `persisted_avatar` is the avatar currently stored remotely; a pending
/// avatar equal to it is not uploaded again, and it is the fallback when the
/// upload fails.
pub async fn apply_sync_plan(
    ctx: &ServiceContext,
    user_id: &UserId,
    plan: &SyncPlan,
    persisted_avatar: Option<&Avatar>,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut profile = plan.profile.clone();

    if let Some(avatar) = plan.profile.avatar.as_ref().filter(|a| a.is_pending()) {
        if Some(avatar) != persisted_avatar {
            match upload_avatar(ctx, user_id, avatar).await {
                Ok(url) => {
                    debug!(%user_id, %url, "avatar uploaded");
                    profile.avatar = Some(Avatar::Remote(url));
                    report.completed.push(RemoteStage::AvatarUpload);
                }
                Err(message) => {
                    warn!(%user_id, error = %message, "avatar upload failed; keeping previous avatar");
                    profile.avatar = persisted_avatar.cloned();
                    report.avatar_failure = Some(message);
                }
            }
        }
    }

    let updated_at = ctx.clock.now();

    if let Err(e) = ctx.store.upsert_profile(user_id, &profile, updated_at).await {
        report.fail(RemoteStage::ProfileUpsert, &e);
        return report;
    }
    report.completed.push(RemoteStage::ProfileUpsert);
    report.persisted_profile = Some(profile);

    if !plan.deletes.is_empty() {
        if let Err(e) = ctx.store.delete_links(&plan.deletes).await {
            report.fail(RemoteStage::LinkDelete, &e);
            return report;
        }
        report.completed.push(RemoteStage::LinkDelete);
        report.deleted = plan.deletes.len();
    }

    if !plan.upserts.is_empty() {
        if let Err(e) = ctx.store.upsert_links(user_id, &plan.upserts, updated_at).await {
            report.fail(RemoteStage::LinkUpsert, &e);
            return report;
        }
        report.completed.push(RemoteStage::LinkUpsert);
        report.upserted = plan.upserts.len();
    }

    info!(
        %user_id,
        deleted = report.deleted,
        upserted = report.upserted,
        avatar_failed = report.avatar_failure.is_some(),
        "sync plan applied"
    );
    report
}

async fn upload_avatar(
    ctx: &ServiceContext,
    user_id: &UserId,
    avatar: &Avatar,
) -> Result<String, String> {
    let image = avatar.decode().map_err(|e| e.to_string())?;
    ctx.avatars.upload_avatar(user_id, &image).await.map_err(|e| e.to_string())
}

/// Formats a report as a human-readable summary.
#[must_use]
pub fn format_report(report: &SyncReport) -> String {
    let mut lines = Vec::new();
    for stage in &report.completed {
        lines.push(format!("  OK     {stage}"));
    }
    if let Some(message) = &report.avatar_failure {
        lines.push(format!("  FAILED {}: {message} (previous avatar kept)", RemoteStage::AvatarUpload));
    }
    if let Some(failure) = &report.failure {
        lines.push(format!("  FAILED {}: {}", failure.stage, failure.message));
    }
    lines.push(format!("  {} deleted, {} upserted", report.deleted, report.upserted));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::draft::{compute_sync_plan, Draft};
    use crate::model::{AvatarImage, Link, LinkId};

    fn link(id: &str) -> Link {
        Link::new(id, id, &format!("{id}.example.com")).unwrap()
    }

    fn setup() -> (MemoryBackend, ServiceContext, UserId, Profile) {
        let backend = MemoryBackend::new();
        let user = backend.seed_user("ada@example.com", "pw", "ada");
        let profile = backend.profile_of(&user).unwrap();
        let ctx = ServiceContext::in_memory(&backend, MemoryFileSystem::new());
        (backend, ctx, user, profile)
    }

    fn pending_avatar() -> Avatar {
        Avatar::from_image(&AvatarImage::from_file_bytes("png", vec![1, 2, 3]).unwrap())
    }

    #[tokio::test]
    async fn stages_run_in_order() {
        let (backend, ctx, user, mut profile) = setup();
        profile.avatar = Some(pending_avatar());
        let draft = Draft { profile, links: vec![link("b"), link("c")] };
        let plan = compute_sync_plan(&draft, &[link("a"), link("b")]);

        let report = apply_sync_plan(&ctx, &user, &plan, None).await;

        assert!(report.is_complete());
        assert_eq!(
            backend.calls(),
            vec!["upload_avatar", "upsert_profile", "delete_links", "upsert_links"]
        );
        assert_eq!(report.completed.len(), 4);
        assert_eq!((report.deleted, report.upserted), (1, 2));
        let stored = backend.profile_of(&user).unwrap();
        assert_eq!(stored.avatar, Some(Avatar::Remote(format!("memory://avatars/{user}.png"))));
        assert_eq!(report.persisted_profile, Some(stored));
        assert_eq!(backend.profile_updated_at(&user), Some(ctx.clock.now()));
        assert_eq!(backend.link_updated_at(&LinkId::from("b")), Some(ctx.clock.now()));
    }

    #[tokio::test]
    async fn avatar_failure_keeps_previous_avatar_and_continues() {
        let (backend, ctx, user, mut profile) = setup();
        let previous = Avatar::Remote("https://cdn.example.com/old.jpg".into());
        profile.avatar = Some(pending_avatar());
        let draft = Draft { profile, links: vec![link("a")] };
        let plan = compute_sync_plan(&draft, &[]);
        backend.fail("upload_avatar", "bucket full");

        let report = apply_sync_plan(&ctx, &user, &plan, Some(&previous)).await;

        assert!(!report.is_complete());
        assert!(report.records_persisted());
        assert_eq!(report.avatar_failure.as_deref(), Some("bucket full"));
        assert_eq!(backend.profile_of(&user).unwrap().avatar, Some(previous));
        assert_eq!(backend.links_of(&user).len(), 1);
        let err = report.error().unwrap();
        assert!(matches!(err, HubError::Remote { stage: RemoteStage::AvatarUpload, .. }));
    }

    #[tokio::test]
    async fn delete_failure_stops_before_upserts() {
        let (backend, ctx, user, profile) = setup();
        let draft = Draft { profile, links: vec![link("b")] };
        let plan = compute_sync_plan(&draft, &[link("a"), link("b")]);
        backend.fail("delete_links", "permission denied");

        let report = apply_sync_plan(&ctx, &user, &plan, None).await;

        assert_eq!(backend.calls(), vec!["upsert_profile", "delete_links"]);
        assert_eq!(report.completed, vec![RemoteStage::ProfileUpsert]);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.stage, RemoteStage::LinkDelete);
        assert!(!report.records_persisted());
        assert!(format_report(&report).contains("FAILED link delete: permission denied"));
    }

    #[tokio::test]
    async fn profile_failure_stops_everything() {
        let (backend, ctx, user, profile) = setup();
        let draft = Draft { profile, links: vec![link("a")] };
        let plan = compute_sync_plan(&draft, &[]);
        backend.fail("upsert_profile", "offline");

        let report = apply_sync_plan(&ctx, &user, &plan, None).await;

        assert_eq!(backend.calls(), vec!["upsert_profile"]);
        assert!(report.persisted_profile.is_none());
        assert!(backend.links_of(&user).is_empty());
    }

    #[tokio::test]
    async fn skips_empty_stages_and_known_avatars() {
        let (backend, ctx, user, mut profile) = setup();
        let avatar = pending_avatar();
        profile.avatar = Some(avatar.clone());
        let plan = compute_sync_plan(&Draft { profile, links: Vec::new() }, &[]);

        let report = apply_sync_plan(&ctx, &user, &plan, Some(&avatar)).await;

        assert!(report.is_complete());
        assert_eq!(backend.calls(), vec!["upsert_profile"]);
        assert_eq!(backend.avatar_count(), 0);
    }
}
