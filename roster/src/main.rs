use anyhow::Result;
use tracing::{error, info};

use roster::{
    backend::{StoreBackend, StoreBackendBuilder},
    config::{BackendKind, Config},
    demo,
    logging,
    memory::InMemoryStore,
    store::DocumentStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env()?;
    let kind = config.backend_kind();

    match kind {
        BackendKind::Memory => match InMemoryStore::builder().build().await {
            Ok(backend) => run(kind, DocumentStore::new(backend)).await,
            Err(err) => error!(error = %err, "Failed to create in-memory store"),
        },
        BackendKind::MongoDb => connect_mongodb(&config).await,
    }

    Ok(())
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(config: &Config) {
    use roster::mongodb::MongoDbStore;

    let mut builder = MongoDbStore::builder(&config.mongo_uri);
    if let Some(database) = &config.database {
        builder = builder.database(database.as_str());
    }

    match builder.build().await {
        Ok(backend) => run(BackendKind::MongoDb, DocumentStore::new(backend)).await,
        Err(err) => error!(error = %err, "MongoDB connection failed"),
    }
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_config: &Config) {
    error!("MongoDB support is not compiled in; use a memory:// MONGO_URI");
}

async fn run<B: StoreBackend>(kind: BackendKind, store: DocumentStore<B>) {
    let label = kind.label();

    match store.ping().await {
        Ok(()) => info!("{label} connected"),
        Err(err) => error!(error = %err, "{label} connection error"),
    }

    demo::run(&store).await;

    if let Err(err) = store.shutdown().await {
        error!(error = %err, "Failed to shut down store");
    }
}
