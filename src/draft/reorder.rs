//! Ordering helpers behind drag-and-drop reordering.

use std::collections::HashSet;

use crate::error::{HubError, Result};
use crate::model::LinkId;

/// Checks that `new_order` names exactly the ids in `current`, each once.
///
/// # Errors
///
/// Returns [`HubError::Validation`] describing the first defect found:
/// a length mismatch, a duplicated id, or an id not present in `current`.
pub fn check_permutation<'a, I>(current: I, new_order: &[LinkId]) -> Result<()>
where
    I: IntoIterator<Item = &'a LinkId>,
{
    let current: HashSet<&LinkId> = current.into_iter().collect();
    if current.len() != new_order.len() {
        return Err(HubError::Validation(format!(
            "reorder lists {} links but the draft has {}",
            new_order.len(),
            current.len()
        )));
    }

    let mut seen = HashSet::with_capacity(new_order.len());
    for id in new_order {
        if !seen.insert(id) {
            return Err(HubError::Validation(format!("reorder lists link {id} twice")));
        }
        if !current.contains(id) {
            return Err(HubError::Validation(format!("reorder names unknown link {id}")));
        }
    }
    Ok(())
}

/// Moves the element at `from` so that it ends up at index `to`.
///
/// `to` is clamped to the last index. Out-of-range `from` leaves the list as is.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}
