use clap::{ArgAction, Parser};
use ifs_config::Settings;
use ifs_index::Action;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Actions:
  r - rename/move    d - delete
  c - copy           l - link
  i - ignore

Every file is listed in a plan opened in $EDITOR as `<id> <action>   <path>`.
Change the actions and paths, add lines to copy or link a file more than once,
remove lines to leave files alone, then save and quit to carry out the plan.";

#[derive(Debug, Parser)]
#[command(
    name = "ifs",
    version,
    about = "Interactive FileSystem tool: manage large numbers of files with a text editor",
    disable_help_flag = true,
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Directories to scan, including their subdirectories
    #[arg(value_name = "DIRECTORY")]
    pub directories: Vec<PathBuf>,

    /// Do not enter subdirectories of this directory
    #[arg(short = 'n', long = "nonrecursive", value_name = "DIRECTORY", action = ArgAction::Append)]
    pub nonrecursive: Vec<PathBuf>,

    /// Use absolute paths in the plan
    #[arg(short = 'A', long)]
    pub absolute_paths: bool,

    /// Default action for each file
    #[arg(short = 'D', long, value_name = "ACTION", value_parser = parse_action)]
    pub default_action: Option<Action>,

    /// Also list directories
    #[arg(short = 'd', long = "include-dirs")]
    pub include_directories: bool,

    /// Create new directories, if needed
    #[arg(short = 'c', long)]
    pub create_directories: bool,

    /// Keep reopening the editor as long as there are files that have not been processed
    #[arg(short = 'm', long)]
    pub multistage: bool,

    /// Allow overwriting existing files
    #[arg(short = 'o', long)]
    pub allow_overwriting: bool,

    /// Show the actions that would be done without touching the filesystem
    #[arg(short = 's', long)]
    pub simulate: bool,

    /// Do not ask for confirmation, assume "yes" for every action
    #[arg(short = 'y', long)]
    pub yes_to_all: bool,

    /// Number of files processed by extensions at the same time
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Enable an extension: "name[:key=value ...]", or "name:help" for its usage
    #[arg(short = 'x', long = "extension", value_name = "EXTENSION", action = ArgAction::Append)]
    pub extensions: Vec<String>,

    /// Configuration file to use instead of the per-user one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-q, -qq)
    #[arg(short = 'q', action = ArgAction::Count)]
    pub quiet: u8,

    /// Print this help
    #[arg(long, action = ArgAction::SetTrue)]
    pub help: bool,
}

fn parse_action(value: &str) -> Result<Action, String> {
    value.parse().map_err(|err: ifs_index::error::Error| (*err).to_string())
}

impl Cli {
    /// Flags only ever switch settings on; an unset flag keeps the
    /// configured value.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(action) = self.default_action {
            settings.default_action = action.to_string();
        }
        settings.absolute_paths |= self.absolute_paths;
        settings.include_directories |= self.include_directories;
        settings.create_directories |= self.create_directories;
        settings.multistage |= self.multistage;
        settings.allow_overwriting |= self.allow_overwriting;
        settings.simulate |= self.simulate;
        if self.yes_to_all {
            settings.prompt = false;
        }
        if self.workers.is_some() {
            settings.workers = self.workers;
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.directories.is_empty() || !self.nonrecursive.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sources() {
        let cli = Cli::try_parse_from(["ifs", "music", "-n", "inbox", "photos", "--nonrecursive", "tmp"]).unwrap();
        assert_eq!(cli.directories, vec![PathBuf::from("music"), PathBuf::from("photos")]);
        assert_eq!(cli.nonrecursive, vec![PathBuf::from("inbox"), PathBuf::from("tmp")]);
        assert!(cli.has_sources());
        assert!(!Cli::try_parse_from(["ifs"]).unwrap().has_sources());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from(["ifs", "-AcmosyD", "i", "-j", "3", "dir"]).unwrap();
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.default_action, "i");
        assert!(settings.absolute_paths && settings.create_directories && settings.multistage);
        assert!(settings.allow_overwriting && settings.simulate);
        assert!(!settings.prompt);
        assert!(!settings.include_directories);
        assert_eq!(settings.workers, Some(3));
    }

    #[test]
    fn test_unset_flags_keep_configuration() {
        let cli = Cli::try_parse_from(["ifs", "dir"]).unwrap();
        let mut settings = Settings { multistage: true, workers: Some(7), ..Settings::default() };
        cli.apply(&mut settings);
        assert!(settings.multistage);
        assert!(settings.prompt);
        assert_eq!(settings.workers, Some(7));
    }

    #[test]
    fn test_extensions_repeat() {
        let cli = Cli::try_parse_from(["ifs", "-x", "df:unique=drop", "-x", "cadf.audio", "."]).unwrap();
        assert_eq!(cli.extensions, vec!["df:unique=drop", "cadf.audio"]);
    }

    #[rstest]
    #[case(&["ifs", "-D", "x", "dir"])]
    #[case(&["ifs", "--default-action", "rename", "dir"])]
    #[case(&["ifs", "-j", "many", "dir"])]
    #[case(&["ifs", "--frobnicate", "dir"])]
    fn test_rejected(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_help_is_a_flag() {
        assert!(Cli::try_parse_from(["ifs", "--help"]).unwrap().help);
    }
}
