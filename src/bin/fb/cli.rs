//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use filebuddy::{Command, InvocationBuilder};

/// fb - batch file operations driven by a regex pattern
#[derive(Parser, Debug)]
#[command(
    name = "fb",
    version,
    about = "Batch file operations driven by a regex pattern",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Command to execute
    #[arg(value_enum)]
    pub command: CommandArg,

    /// Content pattern for `search`; new name or destination for `rename`, `copy`, `move`
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Regex matched against entry names
    #[arg(short, long, allow_hyphen_values = true)]
    pub pattern: Option<String>,

    /// Directory to operate in
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Descend into subdirectories (also lets `delete` remove non-empty directories)
    #[arg(short, long)]
    pub recursive: bool,

    /// Write results to a file instead of the terminal
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include hidden files and directories
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Report per-entry errors and log progress
    #[arg(short, long)]
    pub verbose: bool,
}

const AFTER_HELP: &str = "\
Templates:
  $(0) is the whole match, $(1), $(2), ... are the pattern's capture groups.

Examples:
  fb list -p '\\.rs$' -r
  fb search 'TODO' -p '\\.rs$' -r
  fb rename -p '^IMG_(\\d+)\\.jpg$' 'photo_$(1).jpg'
  fb move -p '(\\d{4})-\\d{2}-\\d{2}\\.log$' 'archive/$(1)/'";

/// The commands accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandArg {
    Search,
    List,
    Size,
    Rename,
    Delete,
    Copy,
    Move,
}

impl From<CommandArg> for Command {
    fn from(arg: CommandArg) -> Self {
        match arg {
            CommandArg::Search => Command::Search,
            CommandArg::List => Command::List,
            CommandArg::Size => Command::Size,
            CommandArg::Rename => Command::Rename,
            CommandArg::Delete => Command::Delete,
            CommandArg::Copy => Command::Copy,
            CommandArg::Move => Command::Move,
        }
    }
}

impl Cli {
    /// Check the positional arguments against the command and map the flags
    /// onto an invocation.
    pub fn to_builder(&self) -> Result<InvocationBuilder, String> {
        let command = Command::from(self.command);

        let mut builder = filebuddy::invocation(command)
            .root(&self.directory)
            .recursive(self.recursive)
            .include_hidden(self.all)
            .verbose(self.verbose);
        if let Some(pattern) = &self.pattern {
            builder = builder.pattern(pattern);
        }

        match (command, self.args.as_slice()) {
            (Command::Search, []) => {}
            (Command::Search, [content]) => builder = builder.content_pattern(content),
            (Command::Search, _) => {
                return Err("too many arguments: search takes at most one content pattern".into());
            }
            (Command::Rename | Command::Copy | Command::Move, [template]) => {
                builder = builder.template(template);
            }
            (Command::Rename, _) => {
                return Err("rename takes exactly one argument: <new_name>".into());
            }
            (Command::Copy | Command::Move, _) => {
                return Err(format!("{command} takes exactly one argument: <destination>"));
            }
            (_, []) => {}
            (_, _) => return Err(format!("{command} takes no arguments")),
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fb").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_map_onto_the_invocation() {
        let cli = parse(&["rename", "-p", r"(\w+)\.txt", "-r", "-a", "new_$(1).txt"]);
        assert_eq!(cli.command, CommandArg::Rename);
        assert!(cli.recursive && cli.all);
        assert_eq!(cli.args, ["new_$(1).txt"]);
        assert!(cli.to_builder().is_ok());
    }

    #[test]
    fn argument_counts_are_checked() {
        assert!(parse(&["rename", "-p", "x"]).to_builder().is_err());
        assert!(parse(&["list", "extra"]).to_builder().is_err());
        assert!(parse(&["search", "a", "b"]).to_builder().is_err());
        assert!(parse(&["search", "TODO"]).to_builder().is_ok());
    }
}
