use anyhow::Context;
use bson::doc;
use mongodb::{
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use tracing::info;

use crate::config::AppConfig;
use crate::models::{shipment, user, vehicle};

/// Process-scoped handle to the document store. Opened once at startup and
/// shut down explicitly after the server drains; services receive it at
/// construction time.
#[derive(Clone)]
pub struct Store {
    client: Client,
    database: Database,
}

impl Store {
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Releases the connection pool. Consumes the handle; call once, after
    /// the HTTP server has stopped accepting requests.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("document store connection closed");
    }
}

/// Connects to the document store and verifies the deployment is reachable.
/// A failure here is fatal to the process; the caller propagates it out of
/// `main`.
pub async fn establish_connection(cfg: &AppConfig) -> anyhow::Result<Store> {
    let options = ClientOptions::parse(&cfg.mongodb_uri)
        .await
        .context("invalid MongoDB connection URI")?;
    let client = Client::with_options(options).context("failed to build MongoDB client")?;
    let database = client.database(&cfg.mongodb_database);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("MongoDB deployment is not reachable")?;

    info!(database = %cfg.mongodb_database, "connected to document store");
    Ok(Store { client, database })
}

/// Creates the unique indexes the data model relies on: tracking codes,
/// plate numbers, and user emails. Idempotent; safe to run at every startup.
pub async fn ensure_indexes(store: &Store) -> anyhow::Result<()> {
    let db = store.database();

    unique_index(db, shipment::COLLECTION, "trackingId").await?;
    unique_index(db, vehicle::COLLECTION, "plateNumber").await?;
    unique_index(db, user::COLLECTION, "email").await?;

    Ok(())
}

async fn unique_index(db: &Database, collection: &str, field: &str) -> anyhow::Result<()> {
    db.collection::<bson::Document>(collection)
        .create_index(
            IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await
        .with_context(|| format!("failed to create unique index on {}.{}", collection, field))?;
    Ok(())
}
