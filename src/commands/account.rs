//! `linkhub signup`, `linkhub login` and `linkhub logout`.

use crate::context::ServiceContext;
use crate::error::Result;
use crate::session::{Session, SignUpOutcome};

/// Creates the account and profile, then signs in.
///
/// If the backend wants the email confirmed first, the profile is created
/// by the next `linkhub login` instead.
///
/// # Errors
///
/// Returns an error if the username is invalid or taken, or the backend
/// refuses the account.
pub async fn signup(
    ctx: &ServiceContext,
    session: &mut Session,
    email: &str,
    password: &str,
    username: &str,
) -> Result<()> {
    match session.sign_up(ctx, email, password, username).await? {
        SignUpOutcome::Ready(profile) => println!(
            "Welcome, @{}! Your page is ready; add links with `linkhub link add`.",
            profile.username
        ),
        SignUpOutcome::AwaitingConfirmation { email, username } => println!(
            "Account created. Confirm the email sent to {email}, then run `linkhub login`; \
             @{username} is created on first login."
        ),
    }
    Ok(())
}

/// Signs in and loads the saved profile unless unsaved edits would be lost.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the fetch fails.
pub async fn login(
    ctx: &ServiceContext,
    session: &mut Session,
    email: &str,
    password: &str,
) -> Result<()> {
    session.login(ctx, email, password).await?;
    if session.engine.is_dirty() {
        println!("Signed in as {email}. Unsaved edits were kept; `linkhub status` shows them.");
        return Ok(());
    }
    session.pull(ctx, false).await?;
    let draft = session.engine.draft();
    println!("Signed in as {email} (@{}, {} links).", draft.profile.username, draft.links.len());
    Ok(())
}

/// Reports the sign-out; the caller deletes the session file.
pub fn logout(session: &Session) {
    match &session.auth {
        Some(auth) if session.engine.is_dirty() => {
            println!("Signed out {}. Unsaved edits were discarded.", auth.email);
        }
        Some(auth) => println!("Signed out {}.", auth.email),
        None => println!("Not signed in."),
    }
}
