//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tagwatch_check::OutputFormat;

/// tagwatch - check running containers for newer images
#[derive(Parser, Debug)]
#[command(name = "tagwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output and warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config file (default: ~/.tagwatch/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags handed to every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every running container for a newer image
    Check(CheckArgs),

    /// Resolve the current remote digest of one image
    Resolve(ResolveArgs),

    /// Show how an image reference is parsed
    Parse(ParseArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show version information
    Version(VersionArgs),
}

/// Output format flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[default]
    Human,
    Json,
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => OutputFormat::Human,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory searched for compose files
    #[arg(long)]
    pub compose_dir: Option<Utf8PathBuf>,

    /// Skip compose file discovery
    #[arg(long)]
    pub no_compose: bool,

    /// Maximum number of containers checked at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Per-request registry timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Image reference (e.g. nginx, ghcr.io/org/app:v2)
    pub image: String,

    /// Per-request registry timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Image reference to parse
    pub image: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::try_parse_from([
            "tagwatch",
            "-vv",
            "check",
            "--compose-dir",
            "/srv/stacks",
            "-j",
            "8",
            "--timeout",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.compose_dir.as_deref(), Some(Utf8Path::new("/srv/stacks")));
                assert_eq!(args.concurrency, Some(8));
                assert_eq!(args.timeout, Some(3));
                assert_eq!(args.format, FormatArg::Json);
                assert!(!args.no_compose);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["tagwatch", "config", "show", "-c", "/tmp/t.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Utf8Path::new("/tmp/t.yaml")));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["tagwatch", "check", "--format", "xml"]).is_err());
    }
}
