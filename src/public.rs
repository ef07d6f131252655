//! Read-only public view of a profile.

use std::fmt::Write as _;

use crate::context::ServiceContext;
use crate::error::{HubError, PortError, RemoteStage, Result};
use crate::model::{Avatar, Link, Profile};

/// What a visitor sees at `/<username>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPage {
    /// The owner's profile.
    pub profile: Profile,
    /// Active links only, in display order.
    pub links: Vec<Link>,
}

impl PublicPage {
    /// Builds a page, dropping hidden links.
    #[must_use]
    pub fn new(profile: Profile, links: Vec<Link>) -> Self {
        Self { profile, links: links.into_iter().filter(|l| l.active).collect() }
    }
}

/// Looks up a public page by username; `None` if no such user exists.
///
/// # Errors
///
/// Returns [`HubError::Remote`] at the fetch stage if a request fails.
pub async fn fetch_public_page(
    ctx: &ServiceContext,
    username: &str,
) -> Result<Option<PublicPage>> {
    let fetch_err = |e: PortError| HubError::remote(RemoteStage::Fetch, &e);
    let Some((user_id, profile)) =
        ctx.store.fetch_profile_by_username(username.trim()).await.map_err(fetch_err)?
    else {
        return Ok(None);
    };
    let links = ctx.store.fetch_links(&user_id).await.map_err(fetch_err)?;
    Ok(Some(PublicPage::new(profile, links)))
}

/// Renders a page as plain text.
#[must_use]
pub fn render(page: &PublicPage) -> String {
    let profile = &page.profile;
    let mut out = String::new();
    let _ = writeln!(out, "{} (@{})", profile.display_name, profile.username);
    if !profile.description.is_empty() {
        let _ = writeln!(out, "{}", profile.description);
    }
    match &profile.avatar {
        Some(Avatar::Remote(url)) => {
            let _ = writeln!(out, "avatar: {url}");
        }
        Some(Avatar::Pending(_)) | None => {}
    }
    let _ = writeln!(out, "theme: {}", profile.theme);
    out.push('\n');
    if page.links.is_empty() {
        out.push_str("No links yet.\n");
    }
    for link in &page.links {
        let _ = writeln!(out, "- {}: {}", link.title, link.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::model::PositionedLink;

    #[test]
    fn only_active_links_are_shown() {
        let mut hidden = Link::new("b", "Hidden", "b.com").unwrap();
        hidden.active = false;
        let page = PublicPage::new(
            Profile::for_new_user("ada").unwrap(),
            vec![Link::new("a", "Blog", "a.com").unwrap(), hidden],
        );
        let text = render(&page);
        assert!(text.starts_with("ada (@ada)\n"));
        assert!(text.contains("- Blog: https://a.com"));
        assert!(!text.contains("Hidden"));
    }

    #[tokio::test]
    async fn fetches_by_username() {
        let backend = MemoryBackend::new();
        let user = backend.seed_user("a@b.c", "pw", "ada");
        let links = [
            PositionedLink { link: Link::new("b", "Second", "b.com").unwrap(), position: 1 },
            PositionedLink { link: Link::new("a", "First", "a.com").unwrap(), position: 0 },
        ];
        crate::ports::ProfileStore::upsert_links(&backend, &user, &links, chrono::Utc::now())
            .await
            .unwrap();
        let ctx = ServiceContext::in_memory(&backend, MemoryFileSystem::new());

        let page = fetch_public_page(&ctx, "ada").await.unwrap().unwrap();
        let titles: Vec<&str> = page.links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        assert!(fetch_public_page(&ctx, "nobody").await.unwrap().is_none());
    }
}
