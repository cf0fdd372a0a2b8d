use clap::{Parser, Subcommand};
use docnav::description::DescriptionLookup;
use docnav::sync::{Synchronizer, WatchEvent};
use docnav::{config, navbar, output, rewrite, scan, sidebar, watch};
use log::LevelFilter;
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docnav")]
#[command(about = "Navigation and front-matter tooling for markdown documentation sites")]
#[command(long_about = "\
Navigation and front-matter tooling for markdown documentation sites

Directories become categories, markdown files become documents, and an
optional numeric prefix (1.cs, 2.binary-search.md) sets the display order.
Prefixes never appear in public links.

Content structure:

  docs/articles/
  ├── 1.cs/
  │   ├── description.json         # {\"name\": \"...\", \"introduction\": \"...\"}
  │   ├── introduction.md          # Category landing page
  │   └── 1.algorithms/
  │       ├── introduction.md      # Linked from the navbar
  │       └── 2.binary-search.md   # url: 2 → /articles/cs/algorithms/2
  └── blog/                        # No prefix = sorted last

Run 'docnav gen-config' to generate a documented docnav.toml.")]
#[command(version)]
struct Cli {
    /// Project directory containing docnav.toml
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Directory for generated JSON files
    #[arg(long, default_value = ".docnav", global = true)]
    output: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the content tree
    Scan,
    /// Write nav.json, sidebar.json and rewrites.json
    Build,
    /// Number and stamp the given files once
    Sync {
        /// Markdown files inside the content directory
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Watch the content directory and keep front-matter in sync
    Watch,
    /// Print a stock docnav.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        command => run(command, &cli.project, &cli.output)?,
    }

    Ok(())
}

fn run(command: Command, project: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = config::load_config(project)?;
    let content = site_config.content_path(project);

    match command {
        Command::Scan => {
            let tree = scan::scan(&content, &DescriptionLookup::new())?;
            output::print_scan_output(&tree);
        }
        Command::Build => {
            let tree = scan::scan(&content, &DescriptionLookup::new())?;
            let nav = navbar::build_navbar(&tree, &site_config.navbar);
            let side = sidebar::build_sidebar(&tree);
            let rewrites = rewrite::build_rewrites(&tree);

            std::fs::create_dir_all(output_dir)?;
            write_json(&output_dir.join("nav.json"), &nav)?;
            write_json(&output_dir.join("sidebar.json"), &side)?;
            write_json(&output_dir.join("rewrites.json"), &rewrites)?;
            output::print_build_output(&nav, &side, &rewrites, output_dir);
        }
        Command::Sync { files } => {
            let content = content.canonicalize()?;
            let mut sync = Synchronizer::new(&content, site_config.watch.debounce());
            for file in files {
                let file = file.canonicalize()?;
                let actions = sync.handle(&WatchEvent::Created(file.clone()))?;
                output::print_sync_actions(&file, &actions, &content);
            }
        }
        Command::Watch => {
            let handle = watch::start(&content, site_config.watch.debounce())?;
            let (tx, rx) = std::sync::mpsc::channel();
            ctrlc::set_handler(move || {
                let _ = tx.send(());
            })?;
            println!("Watching {} (Ctrl-C to stop)", content.display());
            let _ = rx.recv();
            handle.stop();
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
