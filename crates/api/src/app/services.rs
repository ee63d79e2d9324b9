use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use labelforge_infra::{
    artifacts::{ArtifactError, ArtifactStore},
    batch::{BatchNumberGenerator, BatchSequence, InMemoryBatchSequence, PostgresBatchSequence},
    catalog::{InMemoryProductCatalog, PostgresProductCatalog, ProductCatalog},
    print_jobs::{InMemoryPrintJobRecorder, PostgresPrintJobRecorder, PrintJobRecorder},
    printer::StickerPrinter,
    selections::{InMemorySelectionStore, SelectionStore},
};
use labelforge_labels::Product;
use labelforge_render::SheetLayout;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to connect to postgres: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),
    #[error("failed to read catalog seed {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog seed {path} is not a valid product list: {source}")]
    SeedFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared state handed to every handler.
pub struct AppServices {
    pub printer: StickerPrinter,
    pub selections: Arc<dyn SelectionStore>,
    pub selection_ttl: chrono::Duration,
}

/// The storage ports behind [`AppServices`].
pub struct Stores {
    pub catalog: Arc<dyn ProductCatalog>,
    pub sequence: Arc<dyn BatchSequence>,
    pub recorder: Arc<dyn PrintJobRecorder>,
    pub selections: Arc<dyn SelectionStore>,
}

impl Stores {
    pub fn in_memory(catalog: InMemoryProductCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sequence: Arc::new(InMemoryBatchSequence::new()),
            recorder: Arc::new(InMemoryPrintJobRecorder::new()),
            selections: Arc::new(InMemorySelectionStore::new()),
        }
    }
}

impl AppServices {
    pub fn new(stores: Stores, artifacts: Arc<ArtifactStore>, selection_ttl: chrono::Duration) -> Self {
        let printer = StickerPrinter::new(
            stores.catalog,
            BatchNumberGenerator::new(stores.sequence),
            stores.recorder,
            artifacts,
            SheetLayout::default(),
        );
        Self {
            printer,
            selections: stores.selections,
            selection_ttl,
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, ServicesError> {
    let artifacts = Arc::new(ArtifactStore::open(&config.output_dir, config.artifact_retention).await?);

    let stores = match &config.database_url {
        Some(url) => {
            tracing::info!("using persistent stores");
            build_persistent_stores(url).await?
        }
        None => {
            let catalog = match &config.catalog_seed {
                Some(path) => {
                    let products = load_catalog_seed(path).await?;
                    tracing::info!(path = %path.display(), products = products.len(), "seeded in-memory catalog");
                    InMemoryProductCatalog::new(products)
                }
                None => {
                    tracing::warn!(
                        "USE_PERSISTENT_STORES not enabled and CATALOG_SEED_FILE not set; the product catalog is empty"
                    );
                    InMemoryProductCatalog::default()
                }
            };
            Stores::in_memory(catalog)
        }
    };

    Ok(AppServices::new(stores, artifacts, config.selection_ttl))
}

async fn build_persistent_stores(database_url: &str) -> Result<Stores, ServicesError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(Stores {
        catalog: Arc::new(PostgresProductCatalog::new(pool.clone())),
        sequence: Arc::new(PostgresBatchSequence::new(pool.clone())),
        recorder: Arc::new(PostgresPrintJobRecorder::new(pool)),
        // Selections are short-lived UI state and stay in process memory.
        selections: Arc::new(InMemorySelectionStore::new()),
    })
}

/// Read a JSON array of products for the in-memory catalog.
pub async fn load_catalog_seed(path: &Path) -> Result<Vec<Product>, ServicesError> {
    let raw = tokio::fs::read(path).await.map_err(|source| ServicesError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ServicesError::SeedFormat {
        path: path.to_path_buf(),
        source,
    })
}
