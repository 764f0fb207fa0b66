//! # PixelTrace CLI (`pixeltrace`)
//!
//! Query a photo catalog from the command line or serve it over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! pixeltrace --config ./config/pixeltrace.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pixeltrace search "<query>"` | People whose name matches |
//! | `pixeltrace events "<person>"` | Events a person appears in |
//! | `pixeltrace photos "<event>" "<person>"` | A person's photos in one event |
//! | `pixeltrace stats` | Catalog size summary |
//! | `pixeltrace resolve "<link>"` | Direct image URLs for a Drive link |
//! | `pixeltrace serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pixeltrace::config;
use pixeltrace::facade::{QueryFacade, SearchOutcome};
use pixeltrace::models::{display_event_name, display_name};
use pixeltrace::resolver::ResolvedPhoto;
use pixeltrace::server;

/// PixelTrace: find the events a person appears in and browse their photos.
#[derive(Parser)]
#[command(name = "pixeltrace", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pixeltrace.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search people by name (case-insensitive substring).
    Search {
        query: String,
    },

    /// List the events a person appears in.
    Events {
        /// Person name, e.g. `"Anchal Apurva"` or `anchal_apurva`.
        person: String,
    },

    /// List a person's photos in one event.
    Photos {
        event: String,
        person: String,

        /// Print direct image URLs instead of the stored links.
        #[arg(long)]
        resolve: bool,
    },

    /// Show catalog statistics.
    Stats,

    /// Show direct image URLs for a Drive link. Does not need a config.
    Resolve {
        link: String,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pixeltrace::init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Resolve { link } = &cli.command {
        print_resolved(&ResolvedPhoto::new(link));
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    if let Commands::Serve = cli.command {
        return server::run_server(&cfg).await;
    }

    let facade = QueryFacade::from_config(&cfg)?;

    match cli.command {
        Commands::Search { query } => match facade.search(&query).await? {
            SearchOutcome::NotSearching => {
                println!(
                    "Type at least {} characters to search.",
                    facade.min_query_len()
                );
            }
            SearchOutcome::Found(people) if people.is_empty() => println!("No people found."),
            SearchOutcome::Found(people) => {
                for person in people {
                    println!("{:<32} {}", person, display_name(&person));
                }
            }
        },
        Commands::Events { person } => {
            let events = facade.events_for_person(&person).await?;
            if events.is_empty() {
                println!("{} doesn't appear in any events yet.", display_name(&person));
            }
            for event in events {
                println!(
                    "{:<32} {} photo{}",
                    display_event_name(&event.event_name),
                    event.photo_count,
                    if event.photo_count == 1 { "" } else { "s" }
                );
            }
        }
        Commands::Photos {
            event,
            person,
            resolve,
        } => {
            let photos = facade.photos_for_person_in_event(&event, &person).await?;
            if photos.is_empty() {
                println!(
                    "No photos available for {} in {}.",
                    display_name(&person),
                    display_event_name(&event)
                );
            }
            for photo in photos {
                if resolve {
                    println!("{}", pixeltrace::resolver::resolve(&photo));
                } else {
                    println!("{}", photo);
                }
            }
        }
        Commands::Stats => {
            let stats = facade.stats().await?;
            println!("events:        {}", stats.event_count);
            println!("people:        {}", stats.person_count);
            println!("photo links:   {}", stats.photo_count);
            println!("unique photos: {}", stats.unique_photo_count);
        }
        Commands::Resolve { .. } | Commands::Serve => {
            // Handled above
            unreachable!()
        }
    }

    Ok(())
}

fn print_resolved(resolved: &ResolvedPhoto) {
    match &resolved.file_id {
        Some(id) => println!("file id: {}", id),
        None => println!("file id: (not a Drive file link, passed through)"),
    }
    println!("primary: {}", resolved.primary);
    for (i, url) in resolved.alternatives.iter().enumerate() {
        println!("  [{}] {}", i + 1, url);
    }
}
