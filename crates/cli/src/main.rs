use clap::{Parser, Subcommand};
use recordsdb_core::config::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use recordsdb_core::{ReadConsistency, Store, StoreOptions};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recordsdb", version, about = "Directory-backed JSON record store")]
struct Args {
    /// Root directory of the store
    #[arg(short, long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: String,

    /// fsync each document before it replaces the previous version
    #[arg(long, default_value_t = false, global = true)]
    sync: bool,

    /// Make reads wait for in-flight writes to the same collection
    #[arg(long, default_value_t = false, global = true)]
    locked_reads: bool,

    /// Keep orphaned temp files instead of removing them on startup
    #[arg(long, default_value_t = false, global = true)]
    no_sweep: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a JSON document (read from stdin when omitted)
    Write {
        collection: String,
        resource: String,
        json: Option<String>,
    },
    /// Print a stored document
    Read { collection: String, resource: String },
    /// Print every document in a collection, one per line
    ReadAll { collection: String },
    /// Remove a document
    Delete { collection: String, resource: String },
    /// Remove a collection and all its documents
    Drop { collection: String },
    /// List collections
    List,
    /// Remove temp files left behind by failed writes
    Sweep,
}

impl Args {
    fn store_options(&self) -> StoreOptions {
        let consistency = if self.locked_reads {
            ReadConsistency::Locked
        } else {
            ReadConsistency::Relaxed
        };
        StoreOptions::default()
            .with_sweep_temp_on_open(!self.no_sweep)
            .with_sync_writes(self.sync)
            .with_read_consistency(consistency)
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("recordsdb=info,recordsdb_core=info")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(&args.data_dir, args.store_options())?;

    match args.command {
        Command::Write {
            collection,
            resource,
            json,
        } => {
            let text = match json {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let document: serde_json::Value = serde_json::from_str(&text)?;
            store.write(&collection, &resource, &document)?;
        }
        Command::Read {
            collection,
            resource,
        } => {
            let document: serde_json::Value = store.read(&collection, &resource)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::ReadAll { collection } => {
            for raw in store.read_all(&collection)? {
                let document: serde_json::Value = serde_json::from_str(&raw)?;
                println!("{}", serde_json::to_string(&document)?);
            }
        }
        Command::Delete {
            collection,
            resource,
        } => store.delete(&collection, &resource)?,
        Command::Drop { collection } => store.drop_collection(&collection)?,
        Command::List => {
            for name in store.collections()? {
                println!("{}", name);
            }
        }
        Command::Sweep => {
            let removed = store.sweep_temp_files()?;
            println!("{}", removed);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_json);
    run(args)
}
