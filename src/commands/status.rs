//! `linkhub status` command.

use crate::draft::{format_plan, DraftState};
use crate::error::Result;
use crate::session::Session;

/// Prints who is signed in, the draft's links and the pending plan.
///
/// # Errors
///
/// Never fails today; the signature matches the other handlers.
pub fn run(session: &Session) -> Result<()> {
    print!("{}", render(session));
    Ok(())
}

/// Builds the status report.
#[must_use]
pub fn render(session: &Session) -> String {
    let mut out = String::new();
    match &session.auth {
        Some(auth) => out.push_str(&format!("Signed in as {}\n", auth.email)),
        None => {
            out.push_str("Not signed in. Run `linkhub login` or `linkhub signup`.\n");
            return out;
        }
    }

    let engine = &session.engine;
    let state = match engine.state() {
        DraftState::Empty => {
            out.push_str("Nothing loaded yet; run `linkhub pull`.\n");
            return out;
        }
        DraftState::Loaded => "up to date",
        DraftState::Dirty => "unsaved changes",
        DraftState::Saving => "saving",
    };

    let draft = engine.draft();
    let profile = &draft.profile;
    out.push_str(&format!("Draft: {state}\n\n"));
    out.push_str(&format!(
        "@{} ({}, {} theme)\n",
        profile.username, profile.display_name, profile.theme
    ));
    if profile.avatar.as_ref().is_some_and(crate::model::Avatar::is_pending) {
        out.push_str("avatar: new image, not uploaded yet\n");
    }

    if draft.links.is_empty() {
        out.push_str("No links.\n");
    }
    let id_width = draft.links.iter().map(|l| l.id.as_str().len()).max().unwrap_or(2).max(2);
    for (index, link) in draft.links.iter().enumerate() {
        let hidden = if link.active { "" } else { "  (hidden)" };
        out.push_str(&format!(
            "{index:>3}  {:<id_width$}  {} -> {}{hidden}\n",
            link.id.as_str(),
            link.title,
            link.url
        ));
    }

    if engine.is_dirty() {
        if let Ok(plan) = engine.sync_plan() {
            out.push_str("\nPending save:\n");
            out.push_str(&format_plan(&plan));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Link, Profile, UserId};
    use crate::ports::AuthSession;

    fn signed_in() -> Session {
        let mut session = Session::default();
        session.sign_in(AuthSession::new(UserId::from("u1"), "ada@example.com", "t"));
        session
    }

    #[test]
    fn reports_missing_login_and_load() {
        assert!(render(&Session::default()).contains("Not signed in"));
        assert!(render(&signed_in()).contains("Nothing loaded yet"));
    }

    #[test]
    fn lists_links_and_pending_plan() {
        let mut session = signed_in();
        session.engine.load(
            Profile::for_new_user("ada").unwrap(),
            vec![Link::new("a", "Art", "a.com").unwrap()],
        );
        assert!(render(&session).contains("up to date"));

        session.engine.remove_link(&"a".into()).unwrap();
        session.engine.add_link(Link::new("b", "Blog", "b.com").unwrap()).unwrap();
        session.engine.set_active(&"b".into(), false).unwrap();

        let text = render(&session);
        assert!(text.contains("unsaved changes"));
        assert!(text.contains("Blog -> https://b.com  (hidden)"));
        assert!(text.contains("DELETE a"));
        assert!(text.contains("UPSERT #0 b"));
    }
}
