//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No deployment logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stackweave_core::domain::{Family, StackKind};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stackweave",
    bin_name = "stackweave",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Multi-stack infrastructure synthesis and deployment",
    long_about = "Stackweave synthesizes the finance-log estate as independent stacks \
                  that exchange values through a shared parameter store.",
    after_help = "EXAMPLES:\n\
        \x20 stackweave plan\n\
        \x20 stackweave synth network -i stage=dev\n\
        \x20 stackweave deploy network database -i stage=dev\n\
        \x20 stackweave deploy-all --yes\n\
        \x20 stackweave params list --family network",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the order stacks deploy in.
    #[command(
        about = "Show the deployment order",
        after_help = "EXAMPLES:\n\
            \x20 stackweave plan\n\
            \x20 stackweave plan service bastion"
    )]
    Plan(PlanArgs),

    /// Render one stack without deploying it.
    #[command(
        about = "Synthesize a stack",
        after_help = "EXAMPLES:\n\
            \x20 stackweave synth network\n\
            \x20 stackweave synth service --out service.json"
    )]
    Synth(SynthArgs),

    /// Deploy stacks in dependency order.
    #[command(
        about = "Deploy one or more stacks",
        after_help = "EXAMPLES:\n\
            \x20 stackweave deploy network\n\
            \x20 stackweave deploy service registry identity"
    )]
    Deploy(DeployArgs),

    /// Deploy every stack in the estate.
    #[command(name = "deploy-all", about = "Deploy the whole estate")]
    DeployAll(DeployAllArgs),

    /// Inspect the parameter store.
    #[command(about = "Inspect published parameters", subcommand)]
    Params(ParamsCommands),

    /// Create a configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stackweave init           # default location\n\
            \x20 stackweave init --local   # ./stackweave.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stackweave completions bash > ~/.local/share/bash-completion/completions/stackweave\n\
            \x20 stackweave completions zsh  > ~/.zfunc/_stackweave"
    )]
    Completions(CompletionsArgs),

    /// Inspect the resolved configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stackweave config get store.key_scheme\n\
            \x20 stackweave config list"
    )]
    Config(ConfigCommands),
}

// ── plan / synth / deploy ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Stacks to plan; the whole estate when omitted.
    #[arg(value_name = "STACK", value_parser = parse_stack)]
    pub stacks: Vec<StackKind>,
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    #[arg(value_name = "STACK", value_parser = parse_stack)]
    pub stack: StackKind,

    /// Write the manifest here instead of stdout.
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[arg(value_name = "STACK", required = true, value_parser = parse_stack)]
    pub stacks: Vec<StackKind>,
}

#[derive(Debug, Args)]
pub struct DeployAllArgs {
    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Deploy without asking")]
    pub yes: bool,
}

// ── params ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ParamsCommands {
    /// Every parameter the current environment expects, published or not.
    List {
        /// Only show one family.
        #[arg(long = "family", value_parser = parse_family)]
        family: Option<Family>,
    },
    /// Print one parameter by its full name.
    Get {
        /// Full parameter name, e.g. `dev-network-vpcId`.
        name: String,
    },
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write `stackweave.toml` in the current directory.
    #[arg(long = "local", help = "Create local configuration in current directory")]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.manifest_dir`.
        key: String,
    },
    /// Print the resolved configuration.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── value parsers ─────────────────────────────────────────────────────────────

fn parse_stack(raw: &str) -> Result<StackKind, String> {
    raw.parse().map_err(|_| {
        let known: Vec<_> = StackKind::ALL.iter().map(StackKind::as_str).collect();
        format!("unknown stack '{raw}' (expected one of: {})", known.join(", "))
    })
}

fn parse_family(raw: &str) -> Result<Family, String> {
    raw.parse().map_err(|_| {
        let known: Vec<_> = Family::ALL.iter().map(ToString::to_string).collect();
        format!("unknown family '{raw}' (expected one of: {})", known.join(", "))
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_deploy_keeps_argument_order() {
        let cli = Cli::parse_from(["stackweave", "deploy", "service", "network"]);
        let Commands::Deploy(args) = cli.command else {
            panic!("expected Deploy command");
        };
        assert_eq!(args.stacks, vec![StackKind::Service, StackKind::Network]);
    }

    #[test]
    fn stack_names_accept_underscores() {
        let cli = Cli::parse_from(["stackweave", "synth", "backend_domain"]);
        assert!(matches!(
            cli.command,
            Commands::Synth(SynthArgs { stack: StackKind::BackendDomain, .. })
        ));
    }

    #[test]
    fn unknown_stack_lists_the_known_ones() {
        let err = Cli::try_parse_from(["stackweave", "synth", "lambda"]).unwrap_err();
        assert!(err.to_string().contains("network"));
    }

    #[test]
    fn inputs_are_global_and_repeatable() {
        let cli = Cli::parse_from([
            "stackweave",
            "plan",
            "-i",
            "stage=prod",
            "--input",
            "region=eu-west-1",
        ]);
        assert_eq!(cli.global.inputs.len(), 2);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stackweave", "--quiet", "--verbose", "plan"]);
        assert!(result.is_err());
    }
}
