//! Sync plan computation.
//!
//! A plan is a pure function of the draft and the last persisted link list:
//! links that disappeared are deleted, every surviving link is upserted with
//! its position, and the profile is always written.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Draft;
use crate::model::{Link, LinkId, PositionedLink, Profile};

/// Remote operations needed to persist a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Persisted link ids missing from the draft.
    pub deletes: Vec<LinkId>,
    /// Every draft link with its draft position, in draft order.
    pub upserts: Vec<PositionedLink>,
    /// The draft profile.
    pub profile: Profile,
}

impl SyncPlan {
    /// The links in the order they will be persisted.
    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        self.upserts.iter().map(|p| p.link.clone()).collect()
    }
}

/// Computes the plan that brings the remote store in line with `draft`.
///
/// Surviving links are upserted unconditionally rather than diffed field by
/// field; link lists are small and saves are user-triggered.
#[must_use]
pub fn compute_sync_plan(draft: &Draft, persisted_links: &[Link]) -> SyncPlan {
    let draft_ids: HashSet<&LinkId> = draft.links.iter().map(|l| &l.id).collect();

    let mut seen = HashSet::new();
    let deletes = persisted_links
        .iter()
        .map(|l| &l.id)
        .filter(|id| !draft_ids.contains(id) && seen.insert(*id))
        .cloned()
        .collect();

    let upserts = draft
        .links
        .iter()
        .enumerate()
        .map(|(position, link)| PositionedLink { link: link.clone(), position })
        .collect();

    SyncPlan { deletes, upserts, profile: draft.profile.clone() }
}

/// Formats a plan as a human-readable summary.
#[must_use]
pub fn format_plan(plan: &SyncPlan) -> String {
    let mut lines = vec![format!("  PROFILE @{}", plan.profile.username)];
    for id in &plan.deletes {
        lines.push(format!("  DELETE {id}"));
    }
    for positioned in &plan.upserts {
        let link = &positioned.link;
        let hidden = if link.active { "" } else { " (hidden)" };
        lines.push(format!(
            "  UPSERT #{} {}: {} -> {}{hidden}",
            positioned.position, link.id, link.title, link.url
        ));
    }
    lines.join("\n")
}
