//! Command parsing and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use problist_fetch::is_supported_url;
use problist_import::{CancellationToken, ImportConfig, ImportPipeline};
use problist_store::{Collection, CollectionStore, JsonFileBackend, OfficialCatalog, Problem};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "problist")]
#[command(about = "Problem collections with URL import")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Collections file (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty collection
    Create {
        /// Collection name
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// Optional source URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// List collections
    List {
        /// Only built-in official collections
        #[arg(long, conflicts_with = "custom")]
        official: bool,
        /// Only user-created and imported collections
        #[arg(long)]
        custom: bool,
    },

    /// Show one collection
    Show {
        /// Collection id
        id: String,
        /// Print the stored JSON record
        #[arg(long)]
        json: bool,
    },

    /// Delete a collection
    Delete {
        /// Collection id
        id: String,
    },

    /// Add a problem to a collection
    Add {
        /// Collection id
        list_id: String,
        /// Problem id
        problem_id: String,
        /// Problem title
        #[arg(short, long)]
        title: String,
        /// Problem URL slug
        #[arg(short, long)]
        slug: Option<String>,
        /// Difficulty label
        #[arg(long)]
        difficulty: Option<String>,
        /// Category id, for collections with categories
        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a problem from a collection
    Remove {
        /// Collection id
        list_id: String,
        /// Problem id
        problem_id: String,
    },

    /// Import a study plan, problem list, tag or company page
    Import {
        /// Public URL of the collection
        url: String,
        /// Name to use instead of the remote one
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List collections containing a problem
    Containing {
        /// Problem id or display number
        problem_id: String,
    },

    /// Insert or refresh the built-in official collections
    SyncOfficial,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ImportConfig::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if let Some(path) = cli.store {
        config.storage_path = path;
    }
    debug!("Using collections file {}", config.storage_path.display());

    let store = Arc::new(
        CollectionStore::open(Arc::new(JsonFileBackend::new(&config.storage_path))).await,
    );

    match cli.command {
        Commands::Create {
            name,
            description,
            url,
        } => {
            let collection = store.create(&name, description, url).await?;
            println!("Created {} ({})", collection.name, collection.id);
        }

        Commands::List { official, custom } => {
            let collections = if official {
                store.get_official().await
            } else if custom {
                store.get_custom().await
            } else {
                store.get_all().await
            };
            if collections.is_empty() {
                println!("No collections");
            }
            for collection in &collections {
                print_summary(collection);
            }
        }

        Commands::Show { id, json } => {
            let collection = store
                .get(&id)
                .await
                .with_context(|| format!("no collection with id {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&collection)?);
            } else {
                print_details(&collection);
            }
        }

        Commands::Delete { id } => {
            store.delete(&id).await?;
            println!("Deleted {id}");
        }

        Commands::Add {
            list_id,
            problem_id,
            title,
            slug,
            difficulty,
            category,
        } => {
            let mut problem = Problem::new(problem_id, title);
            if let Some(slug) = slug {
                problem = problem.with_slug(slug);
            }
            if let Some(difficulty) = difficulty {
                problem = problem.with_difficulty(difficulty);
            }
            let collection = store
                .add_problem(&list_id, problem, category.as_deref())
                .await?;
            println!(
                "{} now has {} problems",
                collection.name,
                collection.problems.len()
            );
        }

        Commands::Remove {
            list_id,
            problem_id,
        } => {
            let collection = store.remove_problem(&list_id, &problem_id).await?;
            println!(
                "{} now has {} problems",
                collection.name,
                collection.problems.len()
            );
        }

        Commands::Import { url, name } => {
            if !is_supported_url(&url, &config.fetch.recognized_hosts) {
                anyhow::bail!("{url} is not a supported study plan, problem list, tag or company URL");
            }

            let pipeline = ImportPipeline::from_config(store, config.fetch)?;
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if watch_interrupts(tokio::signal::ctrl_c, on_interrupt).await {
                    std::process::exit(130);
                }
            });

            let collection = pipeline
                .import_with_cancel(&url, name.as_deref(), &cancel)
                .await?;
            println!(
                "Imported {} problems into {} ({})",
                collection.problems.len(),
                collection.name,
                collection.id
            );
        }

        Commands::Containing { problem_id } => {
            let collections = store.lists_containing(&problem_id).await;
            if collections.is_empty() {
                println!("No collection contains {problem_id}");
            }
            for collection in &collections {
                print_summary(collection);
            }
        }

        Commands::SyncOfficial => {
            let synced = store.sync_official(&OfficialCatalog::builtin()).await?;
            println!("Synced {synced} official collections");
        }
    }

    Ok(())
}

/// Cancel on the first interrupt. Returns `true` once a second one arrives.
async fn watch_interrupts<F, Fut>(mut interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    warn!("Cancelling import after the current request; press Ctrl-C again to quit");
    cancel.cancel();

    interrupt().await.is_ok()
}

fn print_summary(collection: &Collection) {
    let marker = if collection.is_official { "*" } else { " " };
    println!(
        "{marker} {:<40} {:>4} problems  {}",
        collection.name,
        collection.problems.len(),
        collection.id
    );
}

fn print_details(collection: &Collection) {
    println!("{} ({})", collection.name, collection.id);
    if let Some(description) = &collection.description {
        println!("  {description}");
    }
    if let Some(url) = &collection.url {
        println!("  {url}");
    }
    println!("  updated {}", collection.updated_at.to_rfc3339());

    match &collection.categories {
        Some(categories) => {
            for category in categories {
                println!("\n[{}] {}", category.id, category.name);
                for problem in &category.problems {
                    print_problem(problem);
                }
            }
        }
        None => {
            println!();
            for problem in &collection.problems {
                print_problem(problem);
            }
        }
    }
}

fn print_problem(problem: &Problem) {
    println!(
        "  {:>5}  {:<8} {}",
        problem.id, problem.difficulty, problem.title
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "problist",
            "import",
            "https://leetcode.com/studyplan/top-100-liked/",
            "--name",
            "Hot",
            "--store",
            "/tmp/lists.json",
        ])
        .unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/lists.json")));
        let Commands::Import { url, name } = cli.command else {
            panic!("expected import");
        };
        assert_eq!(url, "https://leetcode.com/studyplan/top-100-liked/");
        assert_eq!(name.as_deref(), Some("Hot"));
    }

    #[test]
    fn test_list_filters_conflict() {
        assert!(Cli::try_parse_from(["problist", "list", "--official", "--custom"]).is_err());
    }

    #[tokio::test]
    async fn test_second_interrupt_requests_exit() {
        let cancel = CancellationToken::new();
        let quit = watch_interrupts(|| std::future::ready(Ok(())), cancel.clone()).await;
        assert!(quit);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_single_interrupt_only_cancels() {
        let cancel = CancellationToken::new();
        let mut calls = 0;
        let quit = watch_interrupts(
            || {
                calls += 1;
                let result = if calls == 1 {
                    Ok(())
                } else {
                    Err(std::io::Error::other("signal handler gone"))
                };
                std::future::ready(result)
            },
            cancel.clone(),
        )
        .await;

        assert!(!quit);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_no_interrupt_leaves_import_running() {
        let cancel = CancellationToken::new();
        let quit = watch_interrupts(
            || std::future::ready(Err(std::io::Error::other("no signal support"))),
            cancel.clone(),
        )
        .await;

        assert!(!quit);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_sync_official_subcommand_name() {
        let cli = Cli::try_parse_from(["problist", "sync-official"]).unwrap();
        assert!(matches!(cli.command, Commands::SyncOfficial));
    }
}
