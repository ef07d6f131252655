//! `linkhub link ...` commands.

use crate::cli::LinkCommand;
use crate::context::ServiceContext;
use crate::error::{HubError, Result};
use crate::model::{normalize_url, Link, LinkId};
use crate::session::Session;

/// Applies one link edit to the draft.
///
/// # Errors
///
/// Returns an error if nothing is loaded, the id is unknown, or the edit
/// is invalid.
pub fn run(ctx: &ServiceContext, session: &mut Session, command: &LinkCommand) -> Result<()> {
    super::ensure_loaded(session)?;
    let engine = &mut session.engine;

    match command {
        LinkCommand::Add { title, url } => {
            let link = Link::new(ctx.id_gen.generate_id(), title, url)?;
            let id = link.id.clone();
            engine.add_link(link)?;
            println!("Added link {id}.");
        }
        LinkCommand::Edit { id, title, url } => {
            let id = LinkId::from(id.as_str());
            if title.is_none() && url.is_none() {
                return Err(HubError::Validation("nothing to change; pass --title or --url".into()));
            }
            let mut link =
                engine.draft().link(&id).cloned().ok_or_else(|| HubError::NotFound(id.clone()))?;
            if let Some(title) = title {
                link.title = title.trim().to_string();
            }
            if let Some(url) = url {
                link.url = normalize_url(url);
            }
            engine.update_link(link)?;
            println!("Updated link {id}.");
        }
        LinkCommand::Remove { id } => {
            let id = LinkId::from(id.as_str());
            if engine.draft().link(&id).is_none() {
                return Err(HubError::NotFound(id));
            }
            engine.remove_link(&id)?;
            println!("Removed link {id}.");
        }
        LinkCommand::Enable { id } | LinkCommand::Disable { id } => {
            let active = matches!(command, LinkCommand::Enable { .. });
            let id = LinkId::from(id.as_str());
            engine.set_active(&id, active)?;
            println!("Link {id} is now {}.", if active { "visible" } else { "hidden" });
        }
        LinkCommand::Move { id, index } => {
            let id = LinkId::from(id.as_str());
            engine.move_link(&id, *index)?;
            let position = engine.draft().link_ids().iter().position(|l| l == &id).unwrap_or(*index);
            println!("Moved link {id} to position {position}.");
        }
        LinkCommand::Reorder { ids } => {
            let order: Vec<LinkId> = ids.iter().map(|id| LinkId::from(id.as_str())).collect();
            engine.reorder(&order)?;
            println!("Reordered {} link(s).", order.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::model::{Profile, UserId};
    use crate::ports::AuthSession;

    fn setup() -> (ServiceContext, Session) {
        let ctx = ServiceContext::in_memory(&MemoryBackend::new(), MemoryFileSystem::new());
        let mut session = Session::default();
        session.sign_in(AuthSession::new(UserId::from("u1"), "ada@example.com", "t"));
        session.engine.load(Profile::for_new_user("ada").unwrap(), Vec::new());
        (ctx, session)
    }

    fn add(ctx: &ServiceContext, session: &mut Session, title: &str) {
        let command = LinkCommand::Add { title: title.into(), url: format!("{title}.com") };
        run(ctx, session, &command).unwrap();
    }

    fn ids(session: &Session) -> Vec<String> {
        session.engine.draft().links.iter().map(|l| l.id.to_string()).collect()
    }

    #[test]
    fn add_uses_generated_ids_and_normalizes_urls() {
        let (ctx, mut session) = setup();
        add(&ctx, &mut session, "a");
        add(&ctx, &mut session, "b");

        assert_eq!(ids(&session), vec!["link-1", "link-2"]);
        assert_eq!(session.engine.draft().links[0].url, "https://a.com");
    }

    #[test]
    fn edit_move_and_reorder() {
        let (ctx, mut session) = setup();
        for title in ["a", "b", "c"] {
            add(&ctx, &mut session, title);
        }

        let edit = LinkCommand::Edit { id: "link-2".into(), title: Some(" Blog ".into()), url: None };
        run(&ctx, &mut session, &edit).unwrap();
        assert_eq!(session.engine.draft().links[1].title, "Blog");

        run(&ctx, &mut session, &LinkCommand::Move { id: "link-1".into(), index: 99 }).unwrap();
        assert_eq!(ids(&session), vec!["link-2", "link-3", "link-1"]);

        let reorder = LinkCommand::Reorder {
            ids: vec!["link-1".into(), "link-2".into(), "link-3".into()],
        };
        run(&ctx, &mut session, &reorder).unwrap();
        assert_eq!(ids(&session), vec!["link-1", "link-2", "link-3"]);

        let partial = LinkCommand::Reorder { ids: vec!["link-1".into()] };
        assert!(matches!(run(&ctx, &mut session, &partial), Err(HubError::Validation(_))));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (ctx, mut session) = setup();
        for command in [
            LinkCommand::Remove { id: "zz".into() },
            LinkCommand::Disable { id: "zz".into() },
            LinkCommand::Edit { id: "zz".into(), title: Some("x".into()), url: None },
            LinkCommand::Move { id: "zz".into(), index: 0 },
        ] {
            assert!(matches!(run(&ctx, &mut session, &command), Err(HubError::NotFound(_))));
        }
        assert!(!session.engine.is_dirty());
    }

    #[test]
    fn disable_hides_without_moving() {
        let (ctx, mut session) = setup();
        add(&ctx, &mut session, "a");
        add(&ctx, &mut session, "b");
        run(&ctx, &mut session, &LinkCommand::Disable { id: "link-1".into() }).unwrap();

        let links = &session.engine.draft().links;
        assert_eq!(links[0].id.as_str(), "link-1");
        assert!(!links[0].active);
    }
}
