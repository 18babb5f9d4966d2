mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use fs_err as fs;
use proppatch_edit::{patch_file, PatchError, PatchOptions, PatchResult};
use proppatch_rules::{Rule, RuleSet, DEFAULT_PROP};
use proppatch_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "proppatch",
    version,
    about = "Rule-driven prop injection for JSX component files."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the rule pipeline over a file (default: dry-run).
    Apply(ApplyArgs),
    /// Explain what a rule matches and why it exists.
    Explain(ExplainArgs),
    /// List all rules in application order.
    ListRules(ListRulesArgs),
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    /// The component file to patch.
    file: Utf8PathBuf,

    /// Write changes to disk. If omitted, runs a dry-run and only prints the diff.
    #[arg(long, default_value_t = false)]
    write: bool,

    /// Prop name to inject (default: darkMode, or the config file setting).
    #[arg(long)]
    prop: Option<String>,

    /// Fail (exit code 2) when any injection rule matches zero times.
    #[arg(long, default_value_t = false)]
    require_matches: bool,

    /// Skip the backup file when overwriting the target.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Write the JSON run report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// Config file (default: ./proppatch.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule id to explain (e.g., "card.bare", "cleanup.duplicate_prop").
    rule_key: String,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Explain(args) => cmd_explain(args).map_err(PatchError::from),
        Command::ListRules(args) => cmd_list_rules(args).map_err(PatchError::from),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:?}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn cmd_apply(args: ApplyArgs) -> PatchResult<()> {
    // Load config file and merge with CLI arguments
    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_or_default(Utf8Path::new("."))?,
    };
    let merged = ConfigMerger::new(file_config).merge_apply_args(
        args.prop.as_deref(),
        args.require_matches,
        args.no_backup,
    );

    debug!(
        "merged config: prop={}, require_matches={}, backup_enabled={}",
        merged.prop, merged.require_matches, merged.backup_enabled
    );

    if !args.file.exists() {
        return Err(anyhow::anyhow!("target file not found: {}", args.file).into());
    }
    if args.write {
        let metadata = fs::metadata(&args.file)
            .with_context(|| format!("stat {}", args.file))
            .map_err(PatchError::from)?;
        if metadata.permissions().readonly() {
            return Err(anyhow::anyhow!("target file is read-only: {}", args.file).into());
        }
    }

    let rules = RuleSet::for_prop(&merged.prop)?;
    let opts = PatchOptions {
        dry_run: !args.write,
        require_matches: merged.require_matches,
        backup_enabled: merged.backup_enabled,
        backup_suffix: merged.backup_suffix,
    };

    let (report, patch) = patch_file(&args.file, &rules, tool_info(), &opts)?;

    if !patch.is_empty() {
        print!("{}", patch);
        println!();
    }

    println!("  {:<26} MATCHES", "RULE");
    for outcome in &report.outcomes {
        println!("  {:<26} {}", outcome.rule_id, outcome.matches);
    }
    println!();

    if !report.summary.changed {
        println!("no changes needed for {}", args.file);
    } else if report.dry_run {
        println!(
            "dry-run: {} replacements pending for {} (use --write to apply)",
            report.summary.replacements, args.file
        );
    } else {
        println!(
            "patched {}: {} replacements",
            args.file, report.summary.replacements
        );
    }

    if let Some(report_path) = &args.report {
        write_json(report_path, &report).map_err(PatchError::from)?;
    }

    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let rules = RuleSet::for_prop(DEFAULT_PROP)?;
    let Some(rule) = rules.lookup(&args.rule_key) else {
        let available = rules
            .rules()
            .iter()
            .chain(std::iter::once(rules.cleanup()))
            .map(Rule::id)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule_key,
            available
        );
    };

    println!("================================================================================");
    println!("RULE: {}", rule.title());
    println!("================================================================================");
    println!();
    println!("Id:      {}", rule.id());
    println!("Pattern: {}", rule.pattern());
    println!();
    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.description());
    println!();

    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    let rules = RuleSet::for_prop(DEFAULT_PROP)?;
    let all: Vec<&Rule> = rules
        .rules()
        .iter()
        .chain(std::iter::once(rules.cleanup()))
        .collect();

    match args.format {
        OutputFormat::Text => {
            println!("Rules, in application order:\n");
            println!("  {:<26} TITLE", "RULE");
            println!("  {:<26} -----", "----");
            for rule in &all {
                println!("  {:<26} {}", rule.id(), rule.title());
            }
            println!();
            println!("Use 'proppatch explain <rule>' for details.");
        }
        OutputFormat::Json => {
            let entries: Vec<_> = all
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id(),
                        "title": r.title(),
                        "pattern": r.pattern(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "proppatch".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
