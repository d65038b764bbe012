use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use envl_core::Envelope;
use envl_diff::{DiffConfig, DiffEngine, DiffSummary, PatchEngine};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .max_depth
        .map(DiffConfig::with_max_depth)
        .unwrap_or_default();
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &config, &cli.format),
        Command::Patch(args) => cmd_patch(args, &config),
        Command::Digest(args) => cmd_digest(args, &cli.format),
        Command::Inspect(args) => cmd_inspect(args, &cli.format),
    }
}

fn read_envelope(path: &Path) -> anyhow::Result<Envelope> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let envelope = Envelope::from_json(&json)
        .with_context(|| format!("{} is not an envelope", path.display()))?;
    debug!(path = %path.display(), digest = %envelope.digest().short_hex(), "loaded envelope");
    Ok(envelope)
}

/// Write an envelope as JSON to `output`, or to stdout without one.
fn write_envelope(envelope: &Envelope, output: Option<&Path>) -> anyhow::Result<()> {
    let json = envelope.to_json()?;
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn cmd_diff(args: DiffArgs, config: &DiffConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let source = read_envelope(&args.source)?;
    let target = read_envelope(&args.target)?;
    let diff = DiffEngine::with_config(config.clone()).diff(&source, &target);
    let summary = DiffSummary::of(&diff)?;
    write_envelope(&diff, args.output.as_deref())?;

    // the diff itself owns stdout when no output file is given
    let report = match format {
        OutputFormat::Json => serde_json::to_string(&summary)?,
        OutputFormat::Text if summary.is_empty() => "No changes.".to_string(),
        OutputFormat::Text => format!(
            "{} {} added, {} deleted, {} edited{}",
            "Diff:".bold(),
            summary.additions.to_string().green(),
            summary.deletions.to_string().red(),
            summary.edits.to_string().yellow(),
            if summary.subject_changed { ", subject changed" } else { "" },
        ),
    };
    if args.output.is_some() {
        println!("{report}");
    } else {
        eprintln!("{report}");
    }
    Ok(())
}

fn cmd_patch(args: PatchArgs, config: &DiffConfig) -> anyhow::Result<()> {
    let source = read_envelope(&args.source)?;
    let diff = read_envelope(&args.diff)?;
    let patched = PatchEngine::with_config(config.clone())
        .apply(&source, &diff)
        .with_context(|| {
            format!(
                "{} does not apply to {}",
                args.diff.display(),
                args.source.display()
            )
        })?;
    write_envelope(&patched, args.output.as_deref())?;
    if let Some(path) = &args.output {
        println!(
            "{} Patched {} -> {}",
            "✓".green().bold(),
            path.display(),
            patched.digest().short_hex().cyan()
        );
    }
    Ok(())
}

fn cmd_digest(args: DigestArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let envelope = read_envelope(&args.file)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "digest": envelope.digest().to_hex() })),
        OutputFormat::Text => println!("{}", envelope.digest().to_hex()),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let envelope = read_envelope(&args.file)?;
    match format {
        OutputFormat::Json => println!("{}", inspect_json(&envelope)),
        OutputFormat::Text => {
            println!("{}  {}", envelope.summary().bold(), envelope.digest().short_hex().cyan());
            println!("  Digest: {}", envelope.digest().to_hex());
            println!("  Assertions: {}", envelope.assertion_count());
            println!("  Elements: {}", envelope.elements_count());
            println!("  Depth: {}", envelope.depth());
        }
    }
    Ok(())
}

fn inspect_json(envelope: &Envelope) -> serde_json::Value {
    json!({
        "summary": envelope.summary(),
        "digest": envelope.digest().to_hex(),
        "assertions": envelope.assertion_count(),
        "elements": envelope.elements_count(),
        "depth": envelope.depth(),
    })
}
