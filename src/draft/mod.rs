//! Draft reconciliation engine.
//!
//! Holds the locally edited copy of a profile and its ordered links next to
//! the last known persisted snapshot (the baseline). Local edits only touch
//! the draft; a save computes a [`SyncPlan`] from draft and baseline, runs it,
//! and re-baselines on success.
//!
//! ```text
//! Empty -> Loaded -> Dirty <-> Saving -> Loaded   (all stages succeeded)
//!                              Saving -> Dirty    (any stage failed)
//! ```

pub mod apply;
pub mod plan;
pub mod reorder;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use apply::{apply_sync_plan, format_report, StageFailure, SyncReport};
pub use plan::{compute_sync_plan, format_plan, SyncPlan};

use crate::context::ServiceContext;
use crate::error::{HubError, Result};
use crate::model::{Link, LinkId, Profile, ProfilePatch, UserId};

/// A profile and its links in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// The profile.
    pub profile: Profile,
    /// Links in display order.
    pub links: Vec<Link>,
}

impl Draft {
    fn position(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| &l.id == id)
    }

    /// Looks a link up by id.
    #[must_use]
    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.iter().find(|l| &l.id == id)
    }

    /// Ids in display order.
    #[must_use]
    pub fn link_ids(&self) -> Vec<LinkId> {
        self.links.iter().map(|l| l.id.clone()).collect()
    }
}

/// Lifecycle state of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Never loaded.
    Empty,
    /// Matches the baseline.
    Loaded,
    /// Has unsaved edits.
    Dirty,
    /// A save is in flight.
    Saving,
}

/// Owns the draft, the baseline and the dirty flag.
///
/// Serializable so a session can be persisted between runs; the in-flight
/// save marker is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEngine {
    draft: Draft,
    baseline: Option<Draft>,
    dirty: bool,
    #[serde(skip)]
    saving: bool,
}

impl DraftEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DraftState {
        if self.saving {
            DraftState::Saving
        } else if self.dirty {
            DraftState::Dirty
        } else if self.baseline.is_some() {
            DraftState::Loaded
        } else {
            DraftState::Empty
        }
    }

    /// The working copy.
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The last known persisted snapshot, if loaded.
    #[must_use]
    pub fn baseline(&self) -> Option<&Draft> {
        self.baseline.as_ref()
    }

    /// Whether the draft has edits not yet persisted.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces draft and baseline with a remote snapshot and clears the dirty flag.
    ///
    /// Calling it again simply re-baselines; an unfinished save is abandoned.
    pub fn load(&mut self, profile: Profile, links: Vec<Link>) {
        debug!(username = %profile.username, links = links.len(), "draft loaded");
        let snapshot = Draft { profile, links };
        self.draft = snapshot.clone();
        self.baseline = Some(snapshot);
        self.dirty = false;
        self.saving = false;
    }

    /// Merges a partial profile update into the draft.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SaveInProgress`] while a save is running.
    pub fn update_profile(&mut self, patch: ProfilePatch) -> Result<()> {
        self.ensure_idle()?;
        self.draft.profile.apply(patch);
        self.dirty = true;
        Ok(())
    }

    /// Appends a link to the end of the draft.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the id is already used or the link is
    /// malformed; the draft is left unchanged.
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        self.ensure_idle()?;
        link.validate()?;
        if self.draft.position(&link.id).is_some() {
            return Err(HubError::Validation(format!("link {} already exists", link.id)));
        }
        self.draft.links.push(link);
        self.dirty = true;
        Ok(())
    }

    /// Replaces the link with the same id, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown id and
    /// [`HubError::Validation`] for a malformed link.
    pub fn update_link(&mut self, link: Link) -> Result<()> {
        self.ensure_idle()?;
        link.validate()?;
        let index = self.draft.position(&link.id).ok_or_else(|| HubError::NotFound(link.id.clone()))?;
        self.draft.links[index] = link;
        self.dirty = true;
        Ok(())
    }

    /// Removes a link. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SaveInProgress`] while a save is running.
    pub fn remove_link(&mut self, id: &LinkId) -> Result<()> {
        self.ensure_idle()?;
        self.draft.links.retain(|l| &l.id != id);
        self.dirty = true;
        Ok(())
    }

    /// Shows or hides a link on the public page without moving it.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown id.
    pub fn set_active(&mut self, id: &LinkId, active: bool) -> Result<()> {
        self.ensure_idle()?;
        let index = self.draft.position(id).ok_or_else(|| HubError::NotFound(id.clone()))?;
        self.draft.links[index].active = active;
        self.dirty = true;
        Ok(())
    }

    /// Puts the links in the order given by `new_order`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] unless `new_order` is a permutation of
    /// the draft's ids.
    pub fn reorder(&mut self, new_order: &[LinkId]) -> Result<()> {
        self.ensure_idle()?;
        reorder::check_permutation(self.draft.links.iter().map(|l| &l.id), new_order)?;

        let mut by_id: HashMap<LinkId, Link> =
            self.draft.links.drain(..).map(|l| (l.id.clone(), l)).collect();
        self.draft.links = new_order.iter().filter_map(|id| by_id.remove(id)).collect();
        self.dirty = true;
        Ok(())
    }

    /// Drag-and-drop move: takes the link out and reinserts it at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown id.
    pub fn move_link(&mut self, id: &LinkId, to: usize) -> Result<()> {
        self.ensure_idle()?;
        let from = self.draft.position(id).ok_or_else(|| HubError::NotFound(id.clone()))?;
        let mut order = self.draft.link_ids();
        reorder::move_item(&mut order, from, to);
        self.reorder(&order)
    }

    /// The plan a save would run right now.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotLoaded`] before the first [`load`](Self::load).
    pub fn sync_plan(&self) -> Result<SyncPlan> {
        let baseline = self.baseline.as_ref().ok_or(HubError::NotLoaded)?;
        Ok(compute_sync_plan(&self.draft, &baseline.links))
    }

    /// Enters the `Saving` state and returns the plan to run.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SaveInProgress`] if a save is already running and
    /// [`HubError::NotLoaded`] before the first load.
    pub fn begin_save(&mut self) -> Result<SyncPlan> {
        self.ensure_idle()?;
        let plan = self.sync_plan()?;
        self.saving = true;
        Ok(plan)
    }

    /// Leaves the `Saving` state, re-baselining from what was persisted.
    ///
    /// The dirty flag clears only when every stage succeeded. If just the
    /// avatar upload failed, the baseline still advances to the persisted
    /// records while the draft keeps its pending avatar for the next attempt.
    pub fn finish_save(&mut self, plan: &SyncPlan, report: &SyncReport) {
        if !self.saving {
            return;
        }
        self.saving = false;

        let Some(persisted_profile) = report.persisted_profile.clone() else {
            return;
        };
        if !report.records_persisted() {
            return;
        }

        if report.is_complete() {
            self.draft.profile.avatar.clone_from(&persisted_profile.avatar);
            self.dirty = false;
        }
        self.baseline = Some(Draft { profile: persisted_profile, links: plan.links() });
    }

    /// Computes, runs and settles a save for `user_id`.
    ///
    /// Remote failures are reported in the returned [`SyncReport`], never
    /// discarding local edits.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SaveInProgress`] or [`HubError::NotLoaded`] when the
    /// save cannot start.
    pub async fn save(&mut self, ctx: &ServiceContext, user_id: &UserId) -> Result<SyncReport> {
        let plan = self.begin_save()?;
        let persisted_avatar =
            self.baseline.as_ref().and_then(|b| b.profile.avatar.clone());
        let report = apply_sync_plan(ctx, user_id, &plan, persisted_avatar.as_ref()).await;
        self.finish_save(&plan, &report);
        Ok(report)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.saving {
            return Err(HubError::SaveInProgress);
        }
        Ok(())
    }
}
