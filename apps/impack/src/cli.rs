//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use impack_types::ColorChoice;
use std::path::PathBuf;

/// impack - assemble deployable packages from declarative component lists
#[derive(Parser)]
#[command(name = "impack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assemble deployable packages from declarative component lists")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to <output>/logs/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory (default: <manifest dir>/.impack)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Install prefix on the target system (default: /opt/<name>)
    #[arg(long, global = true, value_name = "DIR")]
    pub pack_home: Option<PathBuf>,
}

/// Manifest location shared by every command
#[derive(Args, Clone)]
pub struct Target {
    /// Manifest file or directory containing impack.json / impack.yaml / impack.yml
    #[arg(default_value = ".")]
    pub target: PathBuf,
}

/// Flags controlling component collection
#[derive(Args, Clone)]
pub struct CollectArgs {
    /// Clone repositories instead of downloading archives
    #[arg(long)]
    pub clone: bool,

    /// Maximum concurrent transfers
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Give up on the whole collection after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Append an `npm rebuild` block to the after-install hook
    #[arg(long)]
    pub rebuild: bool,
}

/// Flags passed to the packager
#[derive(Args, Clone)]
pub struct PackArgs {
    /// Target architecture (default: armhf)
    #[arg(long)]
    pub arch: Option<String>,

    /// Output package file
    #[arg(long, value_name = "FILE")]
    pub package: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the components declared in the manifest
    #[command(alias = "ls")]
    Components {
        #[command(flatten)]
        target: Target,
    },

    /// Fetch every component into the staging tree
    Collect {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        collect: CollectArgs,

        /// Do not generate hooks after collecting
        #[arg(long)]
        skip_hooks: bool,
    },

    /// Generate lifecycle hook scripts from staged components
    Hooks {
        #[command(flatten)]
        target: Target,

        /// Append an `npm rebuild` block to the after-install hook
        #[arg(long)]
        rebuild: bool,

        /// Remove existing hook files first
        #[arg(long)]
        clean: bool,
    },

    /// Run npm in every staged component
    Npm {
        #[command(flatten)]
        target: Target,

        /// npm subcommand
        #[arg(long, default_value = "install")]
        command: String,

        /// Pass --ignore-scripts to npm
        #[arg(long)]
        ignore_scripts: bool,

        /// Extra arguments passed through to npm
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// Build the package from the staging tree and hooks
    Pack {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        pack: PackArgs,
    },

    /// Collect, run npm and pack in one go
    Build {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        collect: CollectArgs,

        #[command(flatten)]
        pack: PackArgs,

        /// Skip the npm step
        #[arg(long)]
        skip_npm: bool,

        /// Pass --ignore-scripts to npm
        #[arg(long)]
        ignore_scripts: bool,
    },
}

impl Commands {
    pub fn target(&self) -> &Target {
        match self {
            Self::Components { target }
            | Self::Collect { target, .. }
            | Self::Hooks { target, .. }
            | Self::Npm { target, .. }
            | Self::Pack { target, .. }
            | Self::Build { target, .. } => target,
        }
    }

    /// Short name used as the log correlation id
    pub fn name(&self) -> &'static str {
        match self {
            Self::Components { .. } => "components",
            Self::Collect { .. } => "collect",
            Self::Hooks { .. } => "hooks",
            Self::Npm { .. } => "npm",
            Self::Pack { .. } => "pack",
            Self::Build { .. } => "build",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn collect_flags_parse() {
        let cli = Cli::parse_from([
            "impack", "collect", "app", "--clone", "--jobs", "2", "--skip-hooks", "--timeout", "60",
        ]);
        match cli.command {
            Commands::Collect {
                target,
                collect,
                skip_hooks,
            } => {
                assert_eq!(target.target, PathBuf::from("app"));
                assert!(collect.clone);
                assert_eq!(collect.jobs, Some(2));
                assert_eq!(collect.timeout, Some(60));
                assert!(skip_hooks);
            }
            _ => panic!("expected collect"),
        }
    }

    #[test]
    fn npm_passes_trailing_arguments() {
        let cli = Cli::parse_from(["impack", "npm", "--", "--no-audit"]);
        match cli.command {
            Commands::Npm { target, command, extra, .. } => {
                assert_eq!(target.target, PathBuf::from("."));
                assert_eq!(command, "install");
                assert_eq!(extra, vec!["--no-audit".to_string()]);
            }
            _ => panic!("expected npm"),
        }
    }
}
