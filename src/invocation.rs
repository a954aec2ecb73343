use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pattern::Pattern;
use crate::template::Template;
use crate::walker::WalkOptions;

/// The operation applied to every selected entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Scan matched files line by line with the content pattern.
    Search,
    /// Report matched paths.
    List,
    /// Report file sizes and aggregated directory sizes.
    Size,
    /// Rename in place using the template as the new name.
    Rename,
    /// Remove matched entries.
    Delete,
    /// Copy to the templated destination.
    Copy,
    /// Move to the templated destination.
    Move,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Search,
        Command::List,
        Command::Size,
        Command::Rename,
        Command::Delete,
        Command::Copy,
        Command::Move,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Search => "search",
            Command::List => "list",
            Command::Size => "size",
            Command::Rename => "rename",
            Command::Delete => "delete",
            Command::Copy => "copy",
            Command::Move => "move",
        }
    }

    /// Whether the command changes the filesystem.
    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            Command::Rename | Command::Delete | Command::Copy | Command::Move
        )
    }

    /// Whether the command computes a destination from a template.
    pub fn needs_template(self) -> bool {
        matches!(self, Command::Rename | Command::Copy | Command::Move)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown command '{s}'"))
    }
}

/// Everything one invocation needs, validated and immutable.
///
/// Built by [`InvocationBuilder`](crate::InvocationBuilder); every component
/// receives it by reference instead of reading ambient state such as the
/// process working directory.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: Command,

    /// Absolute working directory the walk starts from.
    pub root: PathBuf,

    /// Selects entries by name. `None` selects everything.
    pub name_pattern: Option<Pattern>,

    /// Scans file lines for `search`. Falls back to `name_pattern`.
    pub content_pattern: Option<Pattern>,

    /// New name (rename) or destination (copy/move).
    pub template: Option<Template>,

    /// Walk subdirectories; also permits deleting non-empty directories.
    pub recursive: bool,

    pub include_hidden: bool,

    /// Log per-entry failures at `warn` instead of `debug`.
    pub verbose: bool,
}

impl Invocation {
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recursive: self.recursive,
            include_hidden: self.include_hidden,
        }
    }

    /// The pattern `search` scans lines with.
    pub fn line_pattern(&self) -> Option<&Pattern> {
        self.content_pattern.as_ref().or(self.name_pattern.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_round_trip() {
        for c in Command::ALL {
            assert_eq!(c.as_str().parse::<Command>().unwrap(), c);
        }
        assert!("remove".parse::<Command>().is_err());
    }

    #[test]
    fn only_mutating_commands_are_destructive() {
        let destructive: Vec<_> = Command::ALL
            .into_iter()
            .filter(|c| c.is_destructive())
            .collect();
        assert_eq!(
            destructive,
            [Command::Rename, Command::Delete, Command::Copy, Command::Move]
        );
    }
}
