//! Stowage CLI - Manage saved connection profiles in a stowage store

mod profile;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use profile::{profile_validator, ConnectionProfile, Driver};
use stowage_store::{Store, StoreConfig};

#[derive(Parser)]
#[command(name = "stowage")]
#[command(about = "Saved connection profiles backed by a transactional store", long_about = None)]
struct Cli {
    /// JSON store config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Use an ephemeral in-memory store
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a connection profile
    Add {
        /// Profile name
        name: String,
        #[arg(long, value_enum)]
        driver: Driver,
        #[arg(long)]
        host: String,
        /// Defaults to the driver's standard port
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        database: Option<String>,
        #[arg(long)]
        user: Option<String>,
        /// Replace an existing profile with the same name
        #[arg(long)]
        replace: bool,
    },
    /// Print one profile as JSON
    Show {
        name: String,
    },
    /// Print all profiles as JSON
    List {
        /// Field to sort by (e.g. "host", "port", "driver")
        #[arg(short, long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Remove profiles by name, all or nothing
    Remove {
        names: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STOWAGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn store_config(cli: &Cli) -> Result<StoreConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(file) => StoreConfig::load(file)?,
        None => StoreConfig::default(),
    };
    if let Some(path) = &cli.path {
        config.path = path.clone();
    }
    if cli.in_memory {
        config.in_memory = true;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = store_config(&cli)?;
    let mut store = Store::with_validator(config, Arc::new(profile_validator()));
    tracing::debug!("using {}", store.describe());

    match cli.command {
        Commands::Add {
            name,
            driver,
            host,
            port,
            database,
            user,
            replace,
        } => {
            let profile = ConnectionProfile {
                name,
                driver,
                host,
                port: port.unwrap_or_else(|| driver.default_port()),
                database,
                user,
            };
            cmd_add(&mut store, &profile, replace)
        }
        Commands::Show { name } => cmd_show(&store, &name),
        Commands::List { sort, desc } => cmd_list(&store, sort.as_deref(), desc),
        Commands::Remove { names } => cmd_remove(&mut store, &names),
    }
}

fn cmd_add(store: &mut Store, profile: &ConnectionProfile, replace: bool) -> Result<(), Box<dyn Error>> {
    store.save(profile, replace)?;
    println!("Saved '{}'", profile.name);
    Ok(())
}

fn cmd_show(store: &Store, name: &str) -> Result<(), Box<dyn Error>> {
    match store.object::<ConnectionProfile>(&name.to_string())? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => return Err(format!("no profile named '{}'", name).into()),
    }
    Ok(())
}

fn cmd_list(store: &Store, sort: Option<&str>, desc: bool) -> Result<(), Box<dyn Error>> {
    let profiles = match sort {
        Some(field) => store.objects_sorted::<ConnectionProfile>(field, !desc)?,
        None => store.objects::<ConnectionProfile>()?,
    };
    println!("{}", serde_json::to_string_pretty(&profiles)?);
    Ok(())
}

fn cmd_remove(store: &mut Store, names: &[String]) -> Result<(), Box<dyn Error>> {
    let removed = store.update(|ctx| -> stowage_store::Result<usize> {
        let mut removed = 0;
        for name in names {
            if ctx.delete_key::<ConnectionProfile>(name)? {
                removed += 1;
            }
        }
        Ok(removed)
    })?;
    println!("Removed {} of {} profile(s)", removed, names.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_store::StoreError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stowage").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("stowage.json");
        std::fs::write(&file, r#"{ "path": "from-file.redb", "memory_identifier": "cli" }"#)
            .unwrap();

        let cli = parse(&["--config", file.to_str().unwrap(), "--in-memory", "list"]);
        let config = store_config(&cli).unwrap();
        assert!(config.in_memory);
        assert_eq!(config.path, PathBuf::from("from-file.redb"));
        assert_eq!(config.memory_identifier, "cli");
    }

    #[test]
    fn test_add_list_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("profiles.redb");
        let db = db.to_str().unwrap();

        run(parse(&["--path", db, "add", "prod", "--driver", "postgres", "--host", "db1"])).unwrap();
        run(parse(&["--path", db, "add", "cache", "--driver", "redis", "--host", "kv1"])).unwrap();

        let store = Store::new(StoreConfig::persistent(db));
        let by_port: Vec<u16> = store
            .objects_sorted::<ConnectionProfile>("port", true)
            .unwrap()
            .into_iter()
            .map(|p| p.port)
            .collect();
        assert_eq!(by_port, vec![5432, 6379]);
        drop(store);

        run(parse(&["--path", db, "remove", "prod", "missing"])).unwrap();
        let store = Store::new(StoreConfig::persistent(db));
        assert!(store
            .object::<ConnectionProfile>(&"prod".to_string())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_add_rejects_invalid_profile() {
        let cli = parse(&["--in-memory", "add", "prod", "--driver", "mysql", "--host", "db", "--port", "0"]);
        let err = run(cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::ValidationFailed(_))
        ));
    }
}
