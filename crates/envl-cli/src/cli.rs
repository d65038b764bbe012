use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "envl",
    about = "envl: diff and patch content-addressed envelopes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Recursion limit for diff and patch
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the diff that turns one envelope into another
    Diff(DiffArgs),
    /// Apply a diff to an envelope
    Patch(PatchArgs),
    /// Print the digest of an envelope
    Digest(DigestArgs),
    /// Describe an envelope
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Write the diff here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PatchArgs {
    pub source: PathBuf,
    pub diff: PathBuf,
    /// Write the patched envelope here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DigestArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}
