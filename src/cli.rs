//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::Theme;

/// Top-level CLI parser for `linkhub`.
#[derive(Debug, Parser)]
#[command(name = "linkhub", version, about = "Curate a link-in-bio page from the terminal")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account with a fresh profile.
    Signup {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// Public username; letters, digits, '-' and '_'.
        #[arg(long)]
        username: String,
    },
    /// Sign in and keep the session for later commands.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session, including any unsaved draft.
    Logout,
    /// Load the saved profile and links into the draft.
    Pull {
        /// Discard unsaved edits.
        #[arg(long)]
        force: bool,
    },
    /// Show the draft and what a save would do.
    Status,
    /// Edit profile fields in the draft.
    Profile(ProfileArgs),
    /// Edit links in the draft.
    #[command(subcommand)]
    Link(LinkCommand),
    /// Push the draft to the backend.
    Save,
    /// Print someone's public page.
    Show {
        /// Username to look up.
        username: String,
    },
}

/// Profile fields to change; omitted ones stay as they are.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Name shown at the top of the page.
    #[arg(long)]
    pub display_name: Option<String>,
    /// Short bio.
    #[arg(long)]
    pub description: Option<String>,
    /// Page theme: light or dark.
    #[arg(long)]
    pub theme: Option<Theme>,
    /// Image file to use as avatar (jpg, png, webp or gif).
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}

/// Link editing subcommands.
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Append a new link.
    Add {
        /// Display text.
        #[arg(long)]
        title: String,
        /// Target; `https://` is added when no scheme is given.
        #[arg(long)]
        url: String,
    },
    /// Change a link's title or URL.
    Edit {
        /// Link id.
        id: String,
        /// New display text.
        #[arg(long)]
        title: Option<String>,
        /// New target.
        #[arg(long)]
        url: Option<String>,
    },
    /// Remove a link.
    Remove {
        /// Link id.
        id: String,
    },
    /// Show a link on the public page.
    Enable {
        /// Link id.
        id: String,
    },
    /// Hide a link from the public page without removing it.
    Disable {
        /// Link id.
        id: String,
    },
    /// Move a link to a zero-based position.
    Move {
        /// Link id.
        id: String,
        /// Target position; larger values move it to the end.
        index: usize,
    },
    /// Set the full order of links.
    Reorder {
        /// Every link id, in the new order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, LinkCommand};
    use crate::model::Theme;
    use clap::Parser;

    #[test]
    fn parses_profile_flags() {
        let cli = Cli::parse_from(["linkhub", "profile", "--theme", "dark", "--display-name", "Ada"]);
        let Command::Profile(args) = cli.command else {
            panic!("expected profile command");
        };
        assert_eq!(args.theme, Some(Theme::Dark));
        assert_eq!(args.display_name.as_deref(), Some("Ada"));
        assert!(args.avatar.is_none());
    }

    #[test]
    fn parses_link_move() {
        let cli = Cli::parse_from(["linkhub", "link", "move", "abc", "2"]);
        assert!(matches!(
            cli.command,
            Command::Link(LinkCommand::Move { ref id, index: 2 }) if id == "abc"
        ));
    }

    #[test]
    fn rejects_unknown_theme_and_empty_reorder() {
        assert!(Cli::try_parse_from(["linkhub", "profile", "--theme", "neon"]).is_err());
        assert!(Cli::try_parse_from(["linkhub", "link", "reorder"]).is_err());
    }

    #[test]
    fn pull_force_defaults_off() {
        let cli = Cli::parse_from(["linkhub", "pull"]);
        assert!(matches!(cli.command, Command::Pull { force: false }));
    }
}
