//! RC-050: CLI subcommands — init, serve, list, show, search, add, chart, status.

use crate::catalog::Catalog;
use crate::chart::hasher;
use crate::chart::render::ChartFormat;
use crate::config::{self, Config, CONFIG_TEMPLATE, DEFAULT_CONFIG_FILE};
use crate::core::defaults::default_recipes;
use crate::core::persist;
use crate::core::store::TableSource;
use crate::core::types::{Recipe, Submission, COL_INGREDIENTS, COL_NAME, COL_PREPARATION};
use crate::web::{self, AppState};
use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Config file (default: ./receptes.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Persisted recipe file
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    /// Directory for the chart artifact
    #[arg(long, global = true)]
    pub static_dir: Option<PathBuf>,

    /// Append logs to this file as well as stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter recipe file and config
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run the web service
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Chart image format (overrides config)
        #[arg(long, value_enum)]
        format: Option<ChartFormat>,
    },

    /// List all recipes
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe by name (case-insensitive)
    Show { name: String },

    /// Search names and ingredients (case-insensitive substring)
    Search { query: String },

    /// Add a recipe
    Add {
        #[arg(long)]
        name: Option<String>,

        /// Comma-space separated, e.g. "Milti, Piens, Olas"
        #[arg(long)]
        ingredients: Option<String>,

        #[arg(long)]
        preparation: Option<String>,
    },

    /// Regenerate the ingredient chart if stale
    Chart {
        /// Regenerate even when fresh
        #[arg(long)]
        force: bool,
    },

    /// Show table source and chart state
    Status,
}

/// Resolve the configuration: file, then environment (through `env`), then flags.
pub fn resolve_config<F>(args: &GlobalArgs, env: F) -> Result<Config, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = config::load_config(args.config.as_deref()).map_err(|e| e.to_string())?;
    cfg.apply_env(env).map_err(|e| e.to_string())?;
    if let Some(csv) = &args.csv {
        cfg.csv_path = csv.clone();
    }
    if let Some(dir) = &args.static_dir {
        cfg.static_dir = dir.clone();
    }
    if let Some(log) = &args.log_file {
        cfg.log_file = Some(log.clone());
    }
    cfg.validate().map_err(|e| e.to_string())?;
    Ok(cfg)
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands, cfg: Config) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Serve { bind, format } => cmd_serve(cfg, bind, format),
        Commands::List { json } => cmd_list(&cfg, json),
        Commands::Show { name } => cmd_show(&cfg, &name),
        Commands::Search { query } => cmd_search(&cfg, &query),
        Commands::Add {
            name,
            ingredients,
            preparation,
        } => cmd_add(&cfg, name, ingredients, preparation),
        Commands::Chart { force } => cmd_chart(&cfg, force),
        Commands::Status => cmd_status(&cfg),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    let csv_path = path.join("recipes.csv");
    for existing in [&config_path, &csv_path] {
        if existing.exists() {
            return Err(format!("{} already exists", existing.display()));
        }
    }

    std::fs::create_dir_all(path.join("static"))
        .map_err(|e| format!("cannot create static dir: {}", e))?;
    std::fs::write(&config_path, CONFIG_TEMPLATE)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;
    persist::save_table(&csv_path, &default_recipes()).map_err(|e| e.to_string())?;

    println!("Initialized receptes at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}", csv_path.display());
    Ok(())
}

fn cmd_serve(mut cfg: Config, bind: Option<String>, format: Option<ChartFormat>) -> Result<(), String> {
    if let Some(bind) = bind {
        cfg.bind = bind;
    }
    if let Some(format) = format {
        cfg.chart_format = format;
    }

    let catalog = Arc::new(Catalog::open(&cfg));
    catalog.startup();
    let state = Arc::new(AppState::new(catalog, cfg.page_cache_ttl()));

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("cannot start runtime: {}", e))?;
    runtime.block_on(web::serve(state, &cfg.bind))
}

fn print_recipe_row(index: usize, r: &Recipe) {
    println!("  {:>3}  {:<24} {}", index, r.name, r.ingredients);
}

fn cmd_list(cfg: &Config, json: bool) -> Result<(), String> {
    let catalog = Catalog::open(cfg);
    let recipes = catalog.store().get_all();
    if json {
        let out = serde_json::to_string_pretty(&recipes)
            .map_err(|e| format!("JSON serialize error: {}", e))?;
        println!("{}", out);
        return Ok(());
    }
    for (i, r) in recipes.iter().enumerate() {
        print_recipe_row(i, r);
    }
    println!("{} recipe(s)", recipes.len());
    Ok(())
}

fn cmd_show(cfg: &Config, name: &str) -> Result<(), String> {
    let catalog = Catalog::open(cfg);
    let recipe = catalog
        .store()
        .get_by_name(name)
        .ok_or_else(|| format!("recipe '{}' not found", name))?;
    println!("{}", recipe.name);
    println!();
    for ingredient in recipe.ingredient_names() {
        println!("  - {}", ingredient);
    }
    println!();
    println!("{}", recipe.preparation);
    Ok(())
}

fn cmd_search(cfg: &Config, query: &str) -> Result<(), String> {
    let catalog = Catalog::open(cfg);
    let results = catalog.store().search(query);
    for (i, r) in results.iter().enumerate() {
        print_recipe_row(i, r);
    }
    println!("{} match(es) for '{}'", results.len(), query);
    Ok(())
}

fn cmd_add(
    cfg: &Config,
    name: Option<String>,
    ingredients: Option<String>,
    preparation: Option<String>,
) -> Result<(), String> {
    let mut submission = Submission::new();
    for (key, value) in [
        (COL_NAME, name),
        (COL_INGREDIENTS, ingredients),
        (COL_PREPARATION, preparation),
    ] {
        if let Some(v) = value {
            submission.insert(key.to_string(), Value::String(v));
        }
    }

    let catalog = Catalog::open(cfg);
    let outcome = catalog.add(&submission).map_err(|e| e.to_string())?;
    println!(
        "Added '{}' ({} recipes)",
        outcome.added.recipe.name, outcome.added.len
    );
    if !outcome.added.persisted {
        eprintln!(
            "  WARNING: not written to {}; the recipe is lost on exit",
            cfg.csv_path.display()
        );
    }
    match outcome.chart {
        Ok(refresh) => println!("  Chart: {}", refresh.path().display()),
        Err(e) => eprintln!("  WARNING: chart not refreshed: {}", e),
    }
    Ok(())
}

fn cmd_chart(cfg: &Config, force: bool) -> Result<(), String> {
    let catalog = Catalog::open(cfg);
    let charts = catalog.charts();
    // A fresh process has no generation record, so only an explicit
    // --force or a missing artifact needs work.
    if !force {
        if let Some(existing) = charts.current_artifact() {
            println!("Chart: {} (kept)", existing.display());
            return Ok(());
        }
    }
    let refresh = charts.ensure_current(true).map_err(|e| e.to_string())?;
    println!("Chart: {} (regenerated)", refresh.path().display());
    Ok(())
}

fn cmd_status(cfg: &Config) -> Result<(), String> {
    let catalog = Catalog::open(cfg);
    let store = catalog.store();
    println!("Recipes: {} ({})", store.len(), store.path().display());
    match store.source() {
        TableSource::File => println!("  Source: file"),
        TableSource::Defaults(reason) => println!("  Source: built-in defaults ({})", reason),
    }
    match catalog.charts().current_artifact() {
        Some(path) => {
            let hash = hasher::hash_file(&path)
                .map_err(|e| format!("cannot hash {}: {}", path.display(), e))?;
            println!("Chart: {}", path.display());
            println!("  Hash: {}", hash);
        }
        None => println!("Chart: none"),
    }
    Ok(())
}
