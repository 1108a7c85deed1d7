//! Feedly Cache CLI - inspect and edit the local feed cache

use clap::{Parser, Subcommand};
use feedly_cache::config::{self, CacheConfig};
use feedly_cache::{
    CacheProvider, CacheStore, ContentValues, Operation, QueryArgs, Request, ResourceAddress,
    Response, Router, Selection,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "feedly-cache")]
#[command(version = "0.0.1")]
#[command(about = "Local cache of feeds, categories and entries for a feed reader")]
#[command(long_about = r#"
Reads and writes the feed reader cache through resource addresses:
  feeds, categories, entries              collections
  feeds/<n>, categories/<n>, entries/<n>  single records
  feeds_by_category/<category id>         feeds filed under a category
  feeds_categories, entries_tags          associations

Example usage:
  feedly-cache init
  feedly-cache insert feeds '{"id": "feed/http://blog.rust-lang.org/feed.xml", "title": "Rust Blog"}'
  feedly-cache query feeds --projection id,title --sort title
  feedly-cache query content://feedly.cache/feeds_by_category/user%2F42%2Fcategory%2Ftech
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the cache schema
    Init {
        /// Authority accepted in qualified addresses
        #[arg(long)]
        authority: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print the rows behind an address as JSON lines
    Query {
        /// Resource address
        address: String,

        /// Columns to return (comma separated, default all)
        #[arg(short, long, value_delimiter = ',')]
        projection: Vec<String>,

        /// Filter with `?` placeholders
        #[arg(short = 'w', long = "where")]
        selection: Option<String>,

        /// Values bound to the filter placeholders, in order
        #[arg(short, long = "arg")]
        args: Vec<String>,

        /// Sort order (collections only)
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Insert a JSON object, or every object of a JSON array in one transaction
    Insert {
        /// Resource address
        address: String,

        /// Column values as JSON
        payload: String,
    },

    /// Update rows matching a filter
    Update {
        /// Resource address
        address: String,

        /// Column values as a JSON object
        payload: String,

        /// Filter with `?` placeholders (default every row)
        #[arg(short = 'w', long = "where")]
        selection: Option<String>,

        /// Values bound to the filter placeholders, in order
        #[arg(short, long = "arg")]
        args: Vec<String>,
    },

    /// Delete rows matching a filter
    Delete {
        /// Resource address
        address: String,

        /// Filter with `?` placeholders (default every row)
        #[arg(short = 'w', long = "where")]
        selection: Option<String>,

        /// Values bound to the filter placeholders, in order
        #[arg(short, long = "arg")]
        args: Vec<String>,
    },

    /// Show row counts per table
    Stats,

    /// Drop every cached row
    Wipe {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

/// Settings after merging the config file with command-line overrides
struct Settings {
    config_path: PathBuf,
    config: CacheConfig,
    database: PathBuf,
}

impl Settings {
    fn resolve(config_path: Option<PathBuf>, database: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.unwrap_or_else(config::default_config_path);
        let config = config::load_config(Some(&config_path))?.unwrap_or_default();
        let database = match database {
            Some(database) => database,
            None => config.database_path(&std::env::current_dir()?),
        };
        Ok(Self {
            config_path,
            config,
            database,
        })
    }

    fn open_store(&self) -> anyhow::Result<CacheStore> {
        config::ensure_db_dir(&self.database)?;
        Ok(CacheStore::open(&self.database)?)
    }

    fn router(&self) -> Router {
        Router::new(self.config.authority())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = Settings::resolve(cli.config, cli.database)?;

    match cli.command {
        Commands::Init { authority, force } => {
            let config = CacheConfig {
                database: Some(settings.database.to_string_lossy().into_owned()),
                authority: authority.or(settings.config.authority.clone()),
            };
            config::write_config(&settings.config_path, &config, force)?;
            let store = settings.open_store()?;

            println!("Config written to {}", settings.config_path.display());
            println!("Cache ready at {} (schema v{})", settings.database.display(), store.version()?);
        }

        Commands::Query {
            address,
            projection,
            selection,
            args,
            sort,
        } => {
            let mut query = QueryArgs::new()
                .projection(projection)
                .selection(selection_from(selection, args));
            if let Some(sort) = sort {
                query = query.sort_order(sort);
            }
            let store = settings.open_store()?;
            let provider = CacheProvider::with_router(&store, settings.router());
            let request = Request::new(ResourceAddress::parse(&address)?, Operation::Query(query));

            match provider.execute(&request)? {
                Response::Rows(cursor) => {
                    let count = cursor.len();
                    for record in cursor {
                        println!("{}", serde_json::to_string(&record)?);
                    }
                    tracing::info!("{} row(s)", count);
                }
                Response::Empty => println!("Nothing to list at {}", address),
                other => anyhow::bail!("unexpected response to query: {:?}", other),
            }
        }

        Commands::Insert { address, payload } => {
            let address = ResourceAddress::parse(&address)?;
            let payload: serde_json::Value = serde_json::from_str(&payload)?;
            let store = settings.open_store()?;
            let provider = CacheProvider::with_router(&store, settings.router());

            if let Some(items) = payload.as_array() {
                let rows = items
                    .iter()
                    .map(ContentValues::from_json)
                    .collect::<feedly_cache::Result<Vec<_>>>()?;
                let written = provider.bulk_insert(&address, &rows)?;
                println!("Inserted {} of {} row(s)", written, rows.len());
            } else {
                let request = Request::new(
                    address,
                    Operation::Insert(ContentValues::from_json(&payload)?),
                );
                if let Response::Inserted(inserted) = provider.execute(&request)? {
                    println!("{}", inserted);
                }
            }
        }

        Commands::Update {
            address,
            payload,
            selection,
            args,
        } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)?;
            let request = Request::new(
                ResourceAddress::parse(&address)?,
                Operation::Update(
                    ContentValues::from_json(&payload)?,
                    selection_from(selection, args),
                ),
            );
            let store = settings.open_store()?;
            let provider = CacheProvider::with_router(&store, settings.router());
            print_affected(provider.execute(&request)?, "Updated");
        }

        Commands::Delete {
            address,
            selection,
            args,
        } => {
            let request = Request::new(
                ResourceAddress::parse(&address)?,
                Operation::Delete(selection_from(selection, args)),
            );
            let store = settings.open_store()?;
            let provider = CacheProvider::with_router(&store, settings.router());
            print_affected(provider.execute(&request)?, "Deleted");
        }

        Commands::Stats => {
            let store = settings.open_store()?;
            println!("Database: {}", settings.database.display());
            println!("{}", feedly_cache::ui::stats_table(&store.stats()?));
        }

        Commands::Wipe { yes } => {
            if !yes {
                anyhow::bail!(
                    "refusing to wipe {} without --yes",
                    settings.database.display()
                );
            }
            if !settings.database.exists() {
                println!("Nothing to wipe at {}", settings.database.display());
                return Ok(());
            }
            let store = settings.open_store()?;
            store.wipe()?;
            println!("Cache wiped");
        }
    }

    Ok(())
}

fn selection_from(clause: Option<String>, args: Vec<String>) -> Selection {
    match clause {
        Some(clause) => Selection::new(clause, args),
        None => Selection::all(),
    }
}

fn print_affected(response: Response, verb: &str) {
    if let Response::Affected(count) = response {
        println!("{} {} row(s)", verb, count);
    }
}
