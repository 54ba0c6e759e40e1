use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use spendsort::commands::{self, FilterInput};
use spendsort::{config, Config, Session};
use spendsort_import::CategorizationEngine;
use spendsort_storage::RuleStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "spendsort", about = "Sort bank statement lines into spending categories.")]
struct Cli {
    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Rule file, taking precedence over the config
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals for a statement: income, expenses, and per-category sums.
    Summary {
        /// Statement CSV export
        file: PathBuf,
        /// Set a transaction's category by hand (repeatable)
        #[arg(long = "override", value_name = "ID=CATEGORY")]
        overrides: Vec<String>,
        /// Only count DEBIT or CREDIT lines in the category table
        #[arg(long)]
        polarity: Option<String>,
    },
    /// List categorized transactions.
    Transactions {
        file: PathBuf,
        #[arg(long)]
        polarity: Option<String>,
    },
    /// Transactions in one category, optionally with an exact amount.
    Filter {
        file: PathBuf,
        #[arg(long)]
        category: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
    },
    /// Show which category a description would get.
    Classify {
        description: String,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage category keywords.
    Keywords {
        #[command(subcommand)]
        command: KeywordsCommands,
    },
}

#[derive(Subcommand)]
enum CategoriesCommands {
    /// List categories and their keywords.
    List,
    /// Add an empty category.
    Add { name: String },
}

#[derive(Subcommand)]
enum KeywordsCommands {
    /// Add a keyword to an existing category.
    Add { category: String, keyword: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, config_dir) = load_config(cli.config.as_deref())?;
    let rules_path = cli
        .rules
        .clone()
        .unwrap_or_else(|| config.rules_path(&config_dir));
    let store = RuleStore::open_or_default(&rules_path)
        .with_context(|| format!("Failed to open rules at {}", rules_path.display()))?;
    let mut session = Session::new(store, CategorizationEngine::new(config.engine));
    let json = cli.json;

    match cli.command {
        Commands::Summary {
            file,
            overrides,
            polarity,
        } => {
            commands::load_statement(&mut session, &file, &config.load)?;
            for raw in &overrides {
                commands::stage_override(&mut session, &commands::parse_override(raw)?)?;
            }
            commands::commit_overrides(&mut session)?;
            let polarity = polarity.as_deref().map(commands::parse_polarity).transpose()?;
            let summary = commands::get_summary(&session, polarity);
            emit(json, &summary, || render::summary(&summary))?;
        }
        Commands::Transactions { file, polarity } => {
            commands::load_statement(&mut session, &file, &config.load)?;
            let polarity = polarity.as_deref().map(commands::parse_polarity).transpose()?;
            let rows = commands::get_transactions(&session, polarity);
            emit(json, &rows, || render::transactions(&rows))?;
        }
        Commands::Filter {
            file,
            category,
            amount,
        } => {
            commands::load_statement(&mut session, &file, &config.load)?;
            let rows = commands::filter_transactions(&session, &FilterInput { category, amount })?;
            emit(json, &rows, || render::transactions(&rows))?;
        }
        Commands::Classify { description, kind } => {
            let result = session
                .engine()
                .classify(session.rules(), &description, kind.as_deref());
            let category = result
                .as_ref()
                .map_or("Uncategorized", |(category, _)| category.as_str());
            emit(json, &result, || println!("{category}"))?;
        }
        Commands::Categories { command } => match command {
            CategoriesCommands::List => {
                let rules = commands::get_rules(&session);
                emit(json, &rules, || render::rules(&rules))?;
            }
            CategoriesCommands::Add { name } => {
                if commands::add_category(&mut session, &name)? {
                    println!("Added category: {}", name.trim());
                } else {
                    println!("Category already exists: {}", name.trim());
                }
            }
        },
        Commands::Keywords { command } => match command {
            KeywordsCommands::Add { category, keyword } => {
                if commands::add_keyword(&mut session, &category, &keyword)? {
                    println!("Added keyword: '{}' \u{2192} {category}", keyword.trim());
                } else {
                    println!("Keyword already present: '{}'", keyword.trim());
                }
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_dir()?.join(config::CONFIG_FILE),
    };
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load(&path)?;
    tracing::debug!("Using config {}", path.display());
    Ok((config, dir))
}

fn emit<T: Serialize>(json: bool, value: &T, table: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        table();
    }
    Ok(())
}
