//! `linkhub show` command.

use crate::context::ServiceContext;
use crate::error::{HubError, Result};
use crate::public::{fetch_public_page, render};

/// Prints the public page of `username`.
///
/// # Errors
///
/// Returns [`HubError::Validation`] for unknown usernames and a remote error
/// if the lookup fails.
pub async fn run(ctx: &ServiceContext, username: &str) -> Result<()> {
    let page = fetch_public_page(ctx, username)
        .await?
        .ok_or_else(|| HubError::Validation(format!("no profile named {username:?}")))?;
    print!("{}", render(&page));
    Ok(())
}
