//! `linkhub profile` command.

use std::path::Path;

use crate::cli::ProfileArgs;
use crate::context::ServiceContext;
use crate::error::{HubError, Result};
use crate::model::{Avatar, AvatarImage, ProfilePatch};
use crate::session::Session;

/// Applies the given profile changes to the draft.
///
/// # Errors
///
/// Returns an error if nothing is loaded, no change was requested, or the
/// avatar file cannot be read or is not an image.
pub fn run(ctx: &ServiceContext, session: &mut Session, args: &ProfileArgs) -> Result<()> {
    super::ensure_loaded(session)?;

    let avatar = args.avatar.as_deref().map(|path| read_avatar(ctx, path)).transpose()?;
    let patch = ProfilePatch {
        display_name: args.display_name.as_ref().map(|s| s.trim().to_string()),
        description: args.description.clone(),
        avatar,
        theme: args.theme,
    };
    if patch.is_empty() {
        return Err(HubError::Validation(
            "nothing to change; pass --display-name, --description, --theme or --avatar".into(),
        ));
    }

    session.engine.update_profile(patch)?;
    println!("Profile updated in the draft; run `linkhub save` to publish.");
    Ok(())
}

/// Reads an image file into a pending avatar.
fn read_avatar(ctx: &ServiceContext, path: &Path) -> Result<Avatar> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let bytes = ctx
        .fs
        .read(path)
        .map_err(|e| HubError::Validation(format!("cannot read {}: {e}", path.display())))?;
    let image = AvatarImage::from_file_bytes(extension, bytes)?;
    Ok(Avatar::from_image(&image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryBackend, MemoryFileSystem};
    use crate::model::{Profile, Theme, UserId};
    use crate::ports::AuthSession;

    fn loaded_session() -> Session {
        let mut session = Session::default();
        session.sign_in(AuthSession::new(UserId::from("u1"), "ada@example.com", "t"));
        session.engine.load(Profile::for_new_user("ada").unwrap(), Vec::new());
        session
    }

    fn args() -> ProfileArgs {
        ProfileArgs { display_name: None, description: None, theme: None, avatar: None }
    }

    #[test]
    fn patches_fields_and_reads_avatar_files() {
        let fs = MemoryFileSystem::new();
        fs.insert("/pics/me.PNG", vec![0x89, b'P', b'N', b'G']);
        let ctx = ServiceContext::in_memory(&MemoryBackend::new(), fs);
        let mut session = loaded_session();

        let args = ProfileArgs {
            display_name: Some("  Ada L ".into()),
            theme: Some(Theme::Dark),
            avatar: Some("/pics/me.PNG".into()),
            ..args()
        };
        run(&ctx, &mut session, &args).unwrap();

        let profile = &session.engine.draft().profile;
        assert_eq!(profile.display_name, "Ada L");
        assert_eq!(profile.theme, Theme::Dark);
        let avatar = profile.avatar.as_ref().unwrap();
        assert!(avatar.as_str().starts_with("data:image/png;base64,"));
        assert!(session.engine.is_dirty());
    }

    #[test]
    fn rejects_empty_patches_and_non_images() {
        let fs = MemoryFileSystem::new();
        fs.insert("/notes.txt", "hello");
        let ctx = ServiceContext::in_memory(&MemoryBackend::new(), fs);
        let mut session = loaded_session();

        assert!(matches!(run(&ctx, &mut session, &args()), Err(HubError::Validation(_))));
        let txt = ProfileArgs { avatar: Some("/notes.txt".into()), ..args() };
        assert!(matches!(run(&ctx, &mut session, &txt), Err(HubError::Validation(_))));
        let missing = ProfileArgs { avatar: Some("/nope.png".into()), ..args() };
        assert!(matches!(run(&ctx, &mut session, &missing), Err(HubError::Validation(_))));
        assert!(!session.engine.is_dirty());
    }

    #[test]
    fn requires_a_loaded_draft() {
        let ctx = ServiceContext::in_memory(&MemoryBackend::new(), MemoryFileSystem::new());
        let mut session = Session::default();
        let args = ProfileArgs { theme: Some(Theme::Dark), ..args() };
        assert!(matches!(run(&ctx, &mut session, &args), Err(HubError::Unauthenticated)));
    }
}
