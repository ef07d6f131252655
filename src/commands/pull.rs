//! `linkhub pull` command.

use crate::context::ServiceContext;
use crate::error::Result;
use crate::session::Session;

/// Replaces the draft with what the backend has.
///
/// # Errors
///
/// Returns an error if the draft has unsaved edits (without `force`), the
/// session is no longer valid, or the fetch fails.
pub async fn run(ctx: &ServiceContext, session: &mut Session, force: bool) -> Result<()> {
    session.pull(ctx, force).await?;
    let draft = session.engine.draft();
    println!("Loaded @{} with {} link(s).", draft.profile.username, draft.links.len());
    Ok(())
}
