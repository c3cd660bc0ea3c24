use std::sync::{Arc, Weak};

use user_storage::config::StorageConfig;
use user_storage::logging::LoggingStorage;
use user_storage::notification::Subscriber;
use user_storage::storage::{MasterStorage, ReplicaStorage, User, UserStorage};

/// Prints every committed change.
struct ConsoleSubscriber;

impl Subscriber for ConsoleSubscriber {
    fn on_record_added(&self, user: &User) {
        tracing::info!("[subscriber] added {} {} ({})", user.first_name, user.last_name, user.age);
    }

    fn on_record_removed(&self, user: &User) {
        tracing::info!("[subscriber] removed {} {}", user.first_name, user.last_name);
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<String> = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let Some(path) = args.get(i + 1) else {
                    eprintln!("Usage: {} [--config <file.json>] [--verbose]", args[0]);
                    std::process::exit(1);
                };
                config_path = Some(path.clone());
                i += 2;
            }
            "--verbose" => {
                verbose = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match config_path {
        Some(path) => StorageConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => StorageConfig::from_env()?,
    };
    tracing::info!("Configuration: {:?}", config);

    // 1. Replicas:
    let replica1 = Arc::new(ReplicaStorage::from_config(&config));
    let replica2 = Arc::new(ReplicaStorage::from_config(&config));

    // 2. Master, fanning out to both replicas:
    let master = Arc::new(MasterStorage::from_config(
        &config,
        vec![replica1.clone(), replica2.clone()],
    ));
    tracing::info!("Master node {}", master.id());

    let subscriber: Arc<dyn Subscriber> = Arc::new(ConsoleSubscriber);
    let weak: Weak<dyn Subscriber> = Arc::downgrade(&subscriber);
    master.add_subscriber(weak)?;

    // 3. Logging decorator in front of the master:
    let storage = LoggingStorage::from_config(master.clone(), &config);

    // 4. Scripted session:
    let ann = storage.add(User::new("Ann", "Lee", 30))?;
    storage.add(User::new("Bob", "Lee", 41))?;
    storage.add(User::new("Ann", "Smith", 30))?;

    if let Err(e) = storage.add(User::new("  ", "Nobody", 20)) {
        tracing::warn!("Rejected: {}", e);
    }
    if let Err(e) = replica1.add(User::new("Eve", "Direct", 25)) {
        tracing::warn!("Rejected: {}", e);
    }

    for user in &storage.search_by_first_name_and_age("Ann", 30)? {
        tracing::info!("Found {} {} ({:?})", user.first_name, user.last_name, user.id);
    }

    storage.remove(&ann)?;

    tracing::info!(
        "Counts: master={} replica1={} replica2={}",
        storage.count(),
        replica1.count(),
        replica2.count()
    );

    Ok(())
}
