//! Vaultgraph CLI
//!
//! - `facts`: list the triples a vault's frontmatter states
//! - `infer`: derive new triples from a vault or a JSON fact file
//! - `analyze`: summarize stated and derived facts
//! - `persist`: write derived triples back into the vault

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use vaultgraph_reasoner::{facts_with_relation, Fact, Reasoner, RuleSet};
use vaultgraph_vault::{DiscoveryPersister, FactExtractor, PersistOptions, Vault, VaultConfig};

mod analyze;

const VAULT_ENV: &str = "VAULTGRAPH_VAULT";

#[derive(Parser)]
#[command(name = "vaultgraph")]
#[command(author, version, about = "Vaultgraph: rule-based discovery over an Obsidian vault")]
struct Cli {
    /// Vault configuration (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct VaultArgs {
    /// Vault root (defaults to $VAULTGRAPH_VAULT).
    vault: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List facts extracted from note frontmatter.
    Facts {
        #[command(flatten)]
        vault: VaultArgs,
        /// Only facts whose relation contains this tag.
        #[arg(long)]
        relation: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Infer new facts and print them as JSON.
    Infer {
        #[command(flatten)]
        vault: VaultArgs,
        /// Read facts from a JSON file instead of a vault.
        #[arg(long, conflicts_with = "vault")]
        facts: Option<PathBuf>,
        /// Rule battery: core|extended (`all` is an alias for extended)
        #[arg(long, default_value = "extended")]
        rules: String,
        /// Output path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Evaluate rules in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Report on stated and inferred facts.
    Analyze {
        #[command(flatten)]
        vault: VaultArgs,
        /// Rule battery: core|extended (`all` is an alias for extended)
        #[arg(long, default_value = "extended")]
        rules: String,
        /// Number of most connected entities to list.
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Infer new facts and write them into note frontmatter.
    Persist {
        #[command(flatten)]
        vault: VaultArgs,
        /// Rule battery: core|extended (`all` is an alias for extended)
        #[arg(long, default_value = "extended")]
        rules: String,
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Facts {
            vault,
            relation,
            json,
        } => cmd_facts(&open_vault(vault, config)?, relation.as_deref(), json),
        Commands::Infer {
            vault,
            facts,
            rules,
            out,
            parallel,
        } => {
            let input = match facts {
                Some(path) => read_facts(&path)?,
                None => FactExtractor::new(&open_vault(vault, config)?).extract_facts(),
            };
            cmd_infer(&input, parse_rule_set(&rules)?, out.as_deref(), parallel)
        }
        Commands::Analyze {
            vault,
            rules,
            top,
            format,
        } => cmd_analyze(
            &open_vault(vault, config)?,
            parse_rule_set(&rules)?,
            top,
            &format,
        ),
        Commands::Persist {
            vault,
            rules,
            dry_run,
        } => cmd_persist(
            &open_vault(vault, config)?,
            parse_rule_set(&rules)?,
            dry_run,
        ),
    }
}

// =============================================================================
// Setup
// =============================================================================

fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    match path {
        Some(path) => VaultConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(VaultConfig::default()),
    }
}

/// `env` is the value of `VAULTGRAPH_VAULT`, if set.
fn resolve_vault_root(arg: Option<PathBuf>, env: Option<String>) -> Result<PathBuf> {
    if let Some(root) = arg {
        return Ok(root);
    }
    env.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("no vault given (pass a path or set {VAULT_ENV})"))
}

fn open_vault(args: VaultArgs, config: VaultConfig) -> Result<Vault> {
    let root = resolve_vault_root(args.vault, std::env::var(VAULT_ENV).ok())?;
    if !root.is_dir() {
        return Err(anyhow!("vault not found: {}", root.display()));
    }
    Ok(Vault::with_config(root, config))
}

fn parse_rule_set(s: &str) -> Result<RuleSet> {
    Ok(s.parse::<RuleSet>()?)
}

fn read_facts(path: &Path) -> Result<Vec<Fact>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read facts {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid fact JSON in {}", path.display()))
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_facts(vault: &Vault, relation: Option<&str>, json: bool) -> Result<()> {
    let facts = FactExtractor::new(vault).extract_facts();
    let selected: Vec<&Fact> = match relation {
        Some(tag) => facts_with_relation(&facts, tag).collect(),
        None => facts.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!(
        "{} {} ({} notes)",
        "Facts from".green().bold(),
        vault.root().display(),
        vault.notes().len()
    );
    for fact in &selected {
        println!("  {} {} {}", fact.subject.cyan(), fact.relation.yellow(), fact.object.cyan());
    }
    println!("{} {}", "Total:".bold(), selected.len());
    Ok(())
}

fn cmd_infer(facts: &[Fact], rule_set: RuleSet, out: Option<&Path>, parallel: bool) -> Result<()> {
    let reasoner = Reasoner::with_rule_set(rule_set);
    let inferred: BTreeSet<Fact> = if parallel {
        reasoner.infer_parallel(facts)
    } else {
        reasoner.infer(facts)
    };
    tracing::info!(
        rule_set = %rule_set,
        input = facts.len(),
        inferred = inferred.len(),
        "inference finished"
    );

    let rendered = serde_json::to_string_pretty(&inferred)?;
    match out {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {} facts to {}", inferred.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn cmd_analyze(vault: &Vault, rule_set: RuleSet, top: usize, format: &str) -> Result<()> {
    let facts = FactExtractor::new(vault).extract_facts();
    let inference = Reasoner::with_rule_set(rule_set).infer_with_stats(&facts);
    let report = analyze::build_report(rule_set.as_str(), &facts, &inference, top);

    let format = format.trim().to_ascii_lowercase();
    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        "text" => analyze::render_report_text(&report),
        other => return Err(anyhow!("unknown --format `{other}` (expected text|json)")),
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_persist(vault: &Vault, rule_set: RuleSet, dry_run: bool) -> Result<()> {
    let facts = FactExtractor::new(vault).extract_facts();
    let inferred = Reasoner::with_rule_set(rule_set).infer(&facts);
    let inferred: Vec<Fact> = inferred.into_iter().collect();

    let stats = DiscoveryPersister::new(vault)
        .with_options(PersistOptions { dry_run })
        .persist(&inferred);

    let verb = if dry_run { "Would update" } else { "Updated" };
    println!("{} {} notes", verb.green().bold(), stats.updated_files);
    for path in &stats.updated_notes {
        let shown = path.strip_prefix(vault.root()).unwrap_or(path);
        println!("  {}", shown.display());
    }
    println!("  Inferred facts: {}", stats.total_facts);
    println!("  Unmapped relations: {}", stats.unmapped_facts);
    println!("  Entities without a note: {}", stats.skipped_entities);
    if stats.failed_notes > 0 {
        println!(
            "  {} {}",
            "Failed notes:".red().bold(),
            stats.failed_notes
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "vaultgraph",
            "infer",
            "--facts",
            "facts.json",
            "--rules",
            "core",
            "--parallel",
        ])
        .unwrap();
        match cli.command {
            Commands::Infer {
                facts,
                rules,
                parallel,
                ..
            } => {
                assert_eq!(facts, Some(PathBuf::from("facts.json")));
                assert_eq!(rules, "core");
                assert!(parallel);
            }
            _ => panic!("expected infer"),
        }

        let cli = Cli::try_parse_from(["vaultgraph", "persist", "vault", "--dry-run", "--config", "c.json"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Persist { dry_run: true, .. }));
    }

    #[test]
    fn test_parse_rule_set() {
        assert_eq!(parse_rule_set("Core").unwrap(), RuleSet::Core);
        assert_eq!(parse_rule_set("all").unwrap(), RuleSet::Extended);
        assert!(parse_rule_set("fast").is_err());
    }

    #[test]
    fn test_explicit_vault_wins_over_env() {
        let root =
            resolve_vault_root(Some(PathBuf::from("/notes")), Some("/from-env".into())).unwrap();
        assert_eq!(root, PathBuf::from("/notes"));
    }

    #[test]
    fn test_vault_falls_back_to_env() {
        let root = resolve_vault_root(None, Some("  /from-env \n".into())).unwrap();
        assert_eq!(root, PathBuf::from("/from-env"));

        assert!(resolve_vault_root(None, Some("   ".into())).is_err());
        assert!(resolve_vault_root(None, None).is_err());
    }

    #[test]
    fn test_read_facts_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let facts_path = dir.path().join("facts.json");
        fs::write(
            &facts_path,
            r#"[{"relation":"PARENT_OF","subject":"A","object":"B"}]"#,
        )
        .unwrap();
        assert_eq!(
            read_facts(&facts_path).unwrap(),
            vec![Fact::new("PARENT_OF", "A", "B")]
        );

        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"inferred_by":"nightly"}"#).unwrap();
        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.inferred_by, "nightly");
        assert_eq!(config.extension, "md");

        assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
    }
}
