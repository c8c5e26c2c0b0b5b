use anyhow::{Context, Result};
use cadence_application::{
    BackfillService, ConversationEngine, ProfileService, Repositories, SchedulingService,
};
use cadence_core::config::RootConfig;
use cadence_core::provider::LlmProvider;
use cadence_infrastructure::{CadencePaths, ConfigService, FileStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: configuration and the opened store.
///
/// The provider is only built by commands that talk to a model, so
/// scheduling works without an API key.
pub struct AppContext {
    pub config: RootConfig,
    pub store: Arc<FileStore>,
    pub repositories: Repositories,
}

impl AppContext {
    pub async fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let config = config_service
            .try_load()
            .context("Failed to load configuration")?;

        let data_dir = match data_dir.or_else(|| config.storage.data_dir.clone()) {
            Some(dir) => dir,
            None => CadencePaths::data_dir().context("Failed to resolve data directory")?,
        };
        let store = Arc::new(
            FileStore::new(&data_dir)
                .await
                .with_context(|| format!("Failed to open store at {}", data_dir.display()))?,
        );
        let repositories = Repositories::from_store(store.clone());

        Ok(Self {
            config,
            store,
            repositories,
        })
    }

    pub fn scheduling_service(&self) -> SchedulingService {
        SchedulingService::new(self.repositories.clone(), &self.config.scheduler)
    }

    pub fn conversation_engine(&self) -> Result<ConversationEngine> {
        Ok(ConversationEngine::new(
            self.repositories.clone(),
            self.profile_service(),
            self.provider()?,
            self.config.conversation.clone(),
        ))
    }

    pub fn backfill_service(&self) -> Result<BackfillService> {
        Ok(BackfillService::new(
            self.repositories.clone(),
            self.profile_service(),
            self.provider()?,
            self.config.conversation.clone(),
        ))
    }

    fn profile_service(&self) -> Arc<ProfileService> {
        Arc::new(ProfileService::new(self.repositories.profiles.clone()))
    }

    fn provider(&self) -> Result<Arc<dyn LlmProvider>> {
        cadence_interaction::provider_from_environment(&self.config.provider)
            .context("Failed to configure language model provider")
    }
}
