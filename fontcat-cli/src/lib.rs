//! fontcat CLI: manage the font-family catalog from a terminal.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use directories::ProjectDirs;
use regex::Regex;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fontcat_core::index::FileIndex;
use fontcat_core::progress::{CancelToken, Progress};
use fontcat_core::reconcile::{reconcile, Locations};
use fontcat_core::scan::FontDirScanner;
use fontcat_core::Catalog;

/// CLI entrypoint for fontcat.
#[derive(Debug, Parser)]
#[command(
    name = "fontcat",
    about = "Catalog, group, and toggle installed font families"
)]
pub struct Cli {
    /// Directory holding the index, cache, and collection files
    #[arg(long = "state-dir", value_hint = ValueHint::DirPath, global = true)]
    state_dir: Option<PathBuf>,

    /// Font directory to scan (repeatable; defaults to platform locations)
    #[arg(long = "font-dir", value_hint = ValueHint::DirPath, global = true)]
    font_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rescan font directories and rebuild the file index
    Sync(SyncArgs),
    /// List font families, optionally restricted to one collection
    List(ListArgs),
    /// Enable font families
    Enable(FamilyArgs),
    /// Disable font families
    Disable(FamilyArgs),
    /// Manage user collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Summarize the catalog
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Follow symlinks while walking font directories
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Collection or category to list instead of all families
    collection: Option<String>,

    /// Only list disabled families
    #[arg(long = "disabled", action = ArgAction::SetTrue)]
    disabled: bool,

    /// Regex that family names must match
    #[arg(short = 'm', long = "match")]
    pattern: Option<String>,

    /// Emit a JSON array of family objects
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct FamilyArgs {
    /// Family names
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum CollectionAction {
    /// List collections in their saved order
    List,
    /// Create a collection, optionally seeded with families
    Create {
        name: String,
        families: Vec<String>,
        /// Free-form description stored with the collection
        #[arg(long)]
        comment: Option<String>,
    },
    /// Rename a collection
    Rename { name: String, new_name: String },
    /// Delete a collection (its member families stay installed)
    Remove { name: String },
    /// Add families to a collection
    Add {
        name: String,
        #[arg(required = true)]
        families: Vec<String>,
    },
    /// Remove families from a collection
    Rm {
        name: String,
        #[arg(required = true)]
        families: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Emit the summary as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let locations = resolve_locations(cli.state_dir.as_deref())?;
    let font_dirs = resolve_font_dirs(&cli.font_dirs);
    debug!(state_dir = %locations.base().display(), font_dirs = font_dirs.len(), "resolved configuration");

    match cli.command {
        Command::Sync(args) => run_sync(&locations, &font_dirs, args),
        Command::List(args) => run_list(&locations, &font_dirs, args),
        Command::Enable(args) => run_set_enabled(&locations, &font_dirs, &args.names, true),
        Command::Disable(args) => run_set_enabled(&locations, &font_dirs, &args.names, false),
        Command::Collection { action } => run_collection(&locations, &font_dirs, action),
        Command::Status(args) => run_status(&locations, &font_dirs, args),
    }
}

fn run_sync(locations: &Locations, font_dirs: &[PathBuf], args: SyncArgs) -> Result<()> {
    let scanner = FontDirScanner::new(font_dirs.iter().cloned()).follow_symlinks(args.follow_symlinks);
    let mut index = FileIndex::open(locations.index_path())?;
    let rows = index.sync(
        &scanner,
        "Scanning font files",
        &mut print_progress,
        &CancelToken::new(),
    )?;
    eprintln!();
    println!("indexed {rows} font files across {} families", index.families().len());
    Ok(())
}

fn run_list(locations: &Locations, font_dirs: &[PathBuf], args: ListArgs) -> Result<()> {
    let catalog = load_catalog(locations, font_dirs)?;
    let pattern = args
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .with_context(|| format!("invalid regex: {}", args.pattern.as_deref().unwrap_or("")))?;

    let names: Vec<String> = match &args.collection {
        Some(wanted) => catalog
            .collection(wanted)
            .or_else(|| catalog.category(wanted))
            .with_context(|| format!("no such collection: {wanted}"))?
            .families
            .iter()
            .cloned()
            .collect(),
        None => catalog.family_names().iter().map(|s| s.to_string()).collect(),
    };

    let selected: Vec<_> = names
        .iter()
        .filter_map(|name| catalog.family(name))
        .filter(|family| !args.disabled || !family.enabled)
        .filter(|family| {
            pattern
                .as_ref()
                .map_or(true, |re| re.is_match(&family.name))
        })
        .collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut handle, &selected)?;
        writeln!(handle)?;
    } else {
        for family in selected {
            let marker = if family.enabled { "" } else { "  [disabled]" };
            writeln!(handle, "{}{marker}", family.name)?;
        }
    }
    Ok(())
}

fn run_set_enabled(
    locations: &Locations,
    font_dirs: &[PathBuf],
    names: &[String],
    enabled: bool,
) -> Result<()> {
    let mut catalog = load_catalog(locations, font_dirs)?;
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    catalog.set_enabled(&refs, enabled)?;
    let verb = if enabled { "enabled" } else { "disabled" };
    println!("{verb} {} family(ies)", refs.len());
    Ok(())
}

fn run_collection(
    locations: &Locations,
    font_dirs: &[PathBuf],
    action: CollectionAction,
) -> Result<()> {
    let mut catalog = load_catalog(locations, font_dirs)?;
    match action {
        CollectionAction::List => {
            for name in catalog.collection_names() {
                let collection = catalog.collection(name).context("collection vanished")?;
                let state = if collection.enabled { "" } else { "  [disabled]" };
                println!("{name} ({}){state}", collection.len());
            }
            return Ok(());
        }
        CollectionAction::Create {
            name,
            families,
            comment,
        } => {
            let refs: Vec<&str> = families.iter().map(String::as_str).collect();
            catalog.create_collection(&name, comment.as_deref(), &refs)?;
        }
        CollectionAction::Rename { name, new_name } => {
            catalog.rename_collection(&name, &new_name)?;
        }
        CollectionAction::Remove { name } => {
            catalog.remove_collection(&name)?;
        }
        CollectionAction::Add { name, families } => {
            let refs: Vec<&str> = families.iter().map(String::as_str).collect();
            catalog.add_families_to(&name, &refs)?;
        }
        CollectionAction::Rm { name, families } => {
            let refs: Vec<&str> = families.iter().map(String::as_str).collect();
            catalog.remove_families_from(&name, &refs)?;
        }
    }
    catalog.save_collections()?;
    Ok(())
}

fn run_status(locations: &Locations, font_dirs: &[PathBuf], args: StatusArgs) -> Result<()> {
    let catalog = load_catalog(locations, font_dirs)?;
    let disabled = catalog.disabled_families();

    if args.json {
        let categories: Vec<_> = catalog
            .categories()
            .iter()
            .map(|c| json!({ "name": c.name, "families": c.len(), "enabled": c.enabled }))
            .collect();
        let summary = json!({
            "families": catalog.family_count(),
            "disabled": disabled.len(),
            "collections": catalog.collection_names().len(),
            "categories": categories,
            "state_dir": locations.base(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("state dir:   {}", locations.base().display());
        println!("families:    {}", catalog.family_count());
        println!("disabled:    {}", disabled.len());
        println!("collections: {}", catalog.collection_names().len());
        for category in catalog.categories() {
            println!("  {:<8} {}", category.name, category.len());
        }
    }
    Ok(())
}

fn load_catalog(locations: &Locations, font_dirs: &[PathBuf]) -> Result<Catalog> {
    let scanner = FontDirScanner::new(font_dirs.iter().cloned());
    reconcile(&scanner, locations, &mut |_| {}, &CancelToken::new())
        .context("could not load the font catalog")
}

fn print_progress(progress: &Progress) {
    eprint!(
        "\r{} {}/{}",
        progress.message, progress.processed, progress.total
    );
}

fn resolve_locations(state_dir: Option<&std::path::Path>) -> Result<Locations> {
    let base = match state_dir {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("org", "", "fontcat")
            .context("could not determine a state directory; pass --state-dir")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&base)
        .with_context(|| format!("could not create state directory {}", base.display()))?;
    Ok(Locations::new(base))
}

fn resolve_font_dirs(requested: &[PathBuf]) -> Vec<PathBuf> {
    if !requested.is_empty() {
        return requested.to_vec();
    }

    if let Ok(raw) = env::var("FONTCAT_FONT_DIRS") {
        let mut overrides: Vec<PathBuf> = raw
            .split([':', ';'])
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        overrides.sort();
        overrides.dedup();
        if !overrides.is_empty() {
            return overrides;
        }
    }

    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(system_root) = env::var_os("SYSTEMROOT") {
            candidates.push(PathBuf::from(system_root).join("Fonts"));
        }
        if let Some(local_appdata) = env::var_os("LOCALAPPDATA") {
            candidates.push(PathBuf::from(local_appdata).join("Microsoft/Windows/Fonts"));
        }
    }

    candidates.retain(|p| p.exists());
    candidates.sort();
    candidates.dedup();
    candidates
}
