use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use common::{
    error::AppError,
    storage::{
        document_store::{DocumentStore, UploadBatch},
        vector_index::VectorIndex,
    },
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use ingestion_pipeline::IngestionPipeline;

/// The process-wide pair of upload batch and vector index. The two are only
/// ever swapped together; readers take `Arc` snapshots so an in-flight
/// request keeps a coherent pair across a concurrent replace.
#[derive(Default)]
pub struct Library {
    batch: Option<Arc<UploadBatch>>,
    index: Option<Arc<VectorIndex>>,
}

impl Library {
    pub fn batch(&self) -> Option<Arc<UploadBatch>> {
        self.batch.as_ref().map(Arc::clone)
    }

    pub fn index(&self) -> Option<Arc<VectorIndex>> {
        self.index.as_ref().map(Arc::clone)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.batch
            .as_ref()
            .map(|batch| batch.file_names.clone())
            .unwrap_or_default()
    }

    /// Publishes a new batch and its index, returning the replaced batch so
    /// the caller can clean its files up.
    pub fn replace(
        &mut self,
        batch: Arc<UploadBatch>,
        index: Arc<VectorIndex>,
    ) -> Option<Arc<UploadBatch>> {
        let previous = self.batch.replace(batch);
        self.index = Some(index);
        previous
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub llm_client: Arc<async_openai::Client<async_openai::config::OpenAIConfig>>,
    pub embedding_provider: Arc<EmbeddingProvider>,
    pub store: DocumentStore,
    pub ingestion: Arc<IngestionPipeline>,
    pub library: Arc<RwLock<Library>>,
    pub upload_lock: Arc<Mutex<()>>,
}

impl ApiState {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let llm_client = Arc::new(async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key(&config.llm_api_key)
                .with_api_base(&config.llm_base_url),
        ));
        let embedding_client = Arc::new(async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key(&config.embedding_api_key)
                .with_api_base(&config.embedding_base_url),
        ));

        let embedding_provider = Arc::new(EmbeddingProvider::from_config(
            config,
            embedding_client,
        )?);
        let store = DocumentStore::new(&config.data_dir).await?;
        let ingestion = Arc::new(IngestionPipeline::new(
            Arc::clone(&embedding_provider),
            config,
        )?);

        Ok(Self {
            config: config.clone(),
            llm_client,
            embedding_provider,
            store,
            ingestion,
            library: Arc::new(RwLock::new(Library::default())),
            upload_lock: Arc::new(Mutex::new(())),
        })
    }
}
