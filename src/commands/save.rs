//! `linkhub save` command.

use crate::context::ServiceContext;
use crate::draft::format_report;
use crate::error::{HubError, Result};
use crate::session::Session;

/// Pushes the draft and prints what happened at each stage.
///
/// # Errors
///
/// Returns an error if nothing is loaded, the session is invalid, or any
/// stage failed. Edits are kept in the draft either way.
pub async fn run(ctx: &ServiceContext, session: &mut Session) -> Result<()> {
    let result = push(ctx, session).await;
    if let Some(hint) = result.as_ref().err().and_then(retry_hint) {
        eprintln!("{hint}");
    }
    result
}

async fn push(ctx: &ServiceContext, session: &mut Session) -> Result<()> {
    super::ensure_loaded(session)?;
    if !session.engine.is_dirty() {
        println!("Nothing to save.");
        return Ok(());
    }

    let report = session.save(ctx).await?;
    println!("{}", format_report(&report));
    match report.error() {
        Some(err) => Err(err),
        None => {
            println!("Saved.");
            Ok(())
        }
    }
}

fn retry_hint(err: &HubError) -> Option<&'static str> {
    err.is_retryable().then_some("Edits kept; run `linkhub save` again to retry.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::error::RemoteStage;
    use crate::model::Link;

    #[test]
    fn only_retryable_failures_get_a_hint() {
        let remote = HubError::Remote { stage: RemoteStage::LinkUpsert, message: "timeout".into() };
        assert!(retry_hint(&remote).is_some_and(|h| h.contains("linkhub save")));
        assert!(retry_hint(&HubError::SaveInProgress).is_some());
        assert_eq!(retry_hint(&HubError::Unauthenticated), None);
        assert_eq!(retry_hint(&HubError::Validation("bad url".into())), None);
    }

    #[tokio::test]
    async fn failed_save_keeps_edits_for_the_retry() {
        let backend = MemoryBackend::new();
        backend.seed_user("ada@example.com", "pw", "ada");
        let ctx = ServiceContext::in_memory(&backend, MemoryFileSystem::new());
        let mut session = Session::default();
        session.login(&ctx, "ada@example.com", "pw").await.unwrap();
        session.pull(&ctx, false).await.unwrap();
        session.engine.add_link(Link::new("x", "X", "x.com").unwrap()).unwrap();

        backend.fail("upsert_links", "connection reset");
        let err = run(&ctx, &mut session).await.unwrap_err();
        assert!(retry_hint(&err).is_some());
        assert!(session.engine.is_dirty());

        backend.recover("upsert_links");
        run(&ctx, &mut session).await.unwrap();
        assert!(!session.engine.is_dirty());
    }
}
