//! Workbench command line
//!
//! Runs page and collection operations against an in-memory store whose
//! contents are loaded from, and written back to, a JSON snapshot file.
//!
//! # Usage
//!
//! ```bash
//! workbench welcome                          # seed the welcome page
//! workbench pages [search]                   # list pages
//! workbench show <page>                      # print a page's blocks
//! workbench new-collection <page> <view>     # add a collection to a page
//! workbench add-item <page> <block> <title>  # add an item to a collection
//! workbench view <page> <block> <view>       # render a collection view as JSON
//! ```
//!
//! # Environment
//!
//! - `WORKBENCH_STORE` - snapshot path (same as `--store`), defaults to `workbench-store.json`
//! - `WORKBENCH_*` - engine settings, see `WorkbenchConfig::from_env`
//! - `RUST_LOG` - log filter, defaults to `info`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use workbench_core::config::WorkbenchConfig;
use workbench_core::models::ViewType;
use workbench_core::services::{CollectionSession, InMemoryBackend, PageService, StoreSnapshot};

#[derive(Parser, Debug)]
#[command(version, about = "Workbench - pages and inline collection views", long_about = None)]
struct Cli {
    /// Path to the JSON store snapshot
    #[arg(long, env = "WORKBENCH_STORE", default_value = "workbench-store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the first page, seeding the welcome page into an empty store
    Welcome,
    /// List pages, optionally filtered by title
    Pages {
        /// Case-insensitive title search
        search: Option<String>,
    },
    /// Print a page's blocks
    Show {
        /// Page name
        page: String,
    },
    /// Add a collection block to a page
    NewCollection {
        page: String,
        /// table, board, calendar, gallery, timeline or list
        view: ViewType,
    },
    /// Add an item to a collection
    AddItem {
        page: String,
        block: String,
        title: String,
    },
    /// Render a collection view as JSON
    View {
        page: String,
        block: String,
        view: ViewType,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = WorkbenchConfig::from_env().context("Invalid WORKBENCH_* configuration")?;
    let backend = Arc::new(InMemoryBackend::from_snapshot(load_snapshot(&cli.store)?));

    run(cli.command, backend.clone(), config.clone()).await?;

    // Let sessions dropped by the command flush their pending saves
    tokio::time::sleep(config.save_debounce().max(config.title_debounce())).await;
    save_snapshot(&cli.store, &backend.snapshot().await)?;
    Ok(())
}

async fn run(command: Command, backend: Arc<InMemoryBackend>, config: WorkbenchConfig) -> anyhow::Result<()> {
    let pages = PageService::new(backend.clone(), config.clone());
    let today = chrono::Local::now().date_naive();

    match command {
        Command::Welcome => {
            let session = pages.open_first_or_welcome().await?;
            println!("✅ {} ({})", session.title(), session.name());
        }
        Command::Pages { search } => {
            for page in pages.list(search.as_deref().unwrap_or("")).await? {
                println!("{}\t{}", page.name, page.title);
            }
        }
        Command::Show { page } => {
            let session = pages.open(&page).await?;
            println!("# {}", session.title());
            let document = session.document();
            let numbers = document.numbered_positions();
            for (block, number) in document.blocks().iter().zip(numbers) {
                let marker = match number {
                    Some(n) => format!("{}.", n),
                    None => block.block_type.to_string(),
                };
                let indent = "  ".repeat(block.level.saturating_sub(1) as usize);
                println!("{}{:<10} {}", indent, marker, block.text);
            }
        }
        Command::NewCollection { page, view } => {
            let session = CollectionSession::create_collection(backend, config, &page, view).await?;
            println!("✅ Created {} collection {}", view, session.block_id());
        }
        Command::AddItem { page, block, title } => {
            let mut session = CollectionSession::load(backend, config, &page, &block, ViewType::Table).await?;
            let mut editor = session.create_item(today).await;
            editor.set_title(title);
            let item = session.save_item(&editor).await?;
            println!("✅ Added item {}", item.id);
        }
        Command::View { page, block, view } => {
            let mut session = CollectionSession::load(backend, config, &page, &block, view).await?;
            session.switch_view(view).await;
            println!("{}", serde_json::to_string_pretty(&session.render(today))?);
        }
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<StoreSnapshot> {
    if !path.exists() {
        tracing::info!("No store at {}, starting empty", path.display());
        return Ok(StoreSnapshot::default());
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(list: &[&str]) -> Command {
        let argv = std::iter::once("workbench").chain(list.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert!(snapshot.pages.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_a_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let backend = Arc::new(InMemoryBackend::new());

        run(command(&["welcome"]), backend.clone(), WorkbenchConfig::default())
            .await
            .unwrap();
        save_snapshot(&path, &backend.snapshot().await).unwrap();

        let reloaded = load_snapshot(&path).unwrap();
        assert_eq!(reloaded.pages.len(), 1);
        let page = reloaded.pages.values().next().unwrap();
        assert_eq!(page.title, "Welcome to Workbench");
        assert_eq!(page.content.as_ref().map(|c| c.blocks.len()), Some(10));
    }

    #[tokio::test]
    async fn test_collection_commands() {
        let backend = Arc::new(InMemoryBackend::new());
        let config = WorkbenchConfig::default();
        run(command(&["welcome"]), backend.clone(), config.clone()).await.unwrap();
        let page = backend.snapshot().await.pages.keys().next().cloned().unwrap();

        run(command(&["new-collection", &page, "board"]), backend.clone(), config.clone())
            .await
            .unwrap();
        let block = backend.snapshot().await.collections[0].block_id.clone();

        run(command(&["add-item", &page, &block, "Ship it"]), backend.clone(), config.clone())
            .await
            .unwrap();
        run(command(&["view", &page, &block, "calendar"]), backend.clone(), config)
            .await
            .unwrap();

        let snapshot = backend.snapshot().await;
        assert_eq!(snapshot.collections[0].items.len(), 1);
        assert_eq!(snapshot.collections[0].items[0].prop_str("Title"), Some("Ship it"));
        assert_eq!(snapshot.collections[0].config.date_prop.as_deref(), Some("StartDate"));
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        assert!(Cli::try_parse_from(["workbench", "frobnicate"]).is_err());
        assert!(Cli::try_parse_from(["workbench", "show"]).is_err());
    }

    #[test]
    fn test_unknown_view_type_is_rejected() {
        assert!(Cli::try_parse_from(["workbench", "new-collection", "page-1", "kanban"]).is_err());
    }

    #[test]
    fn test_store_flag_and_arguments_parse() {
        let cli = Cli::try_parse_from(["workbench", "--store", "/tmp/s.json", "view", "p", "b", "timeline"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/s.json"));
        match cli.command {
            Command::View { page, block, view } => {
                assert_eq!((page.as_str(), block.as_str(), view), ("p", "b", ViewType::Timeline));
            }
            other => panic!("expected view, got {:?}", other),
        }
    }
}
