pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::{
    application_workflow::ApplicationWorkflow, candidate_service::CandidateService,
    candidate_store::CandidateStore, memory_store::MemoryCandidateStore,
    pg_store::PgCandidateStore, workflow_notifier::N8nNotifier,
    workflow_notifier::WorkflowNotifier,
};

#[derive(Clone)]
pub struct AppState {
    pub candidate_service: CandidateService,
    pub jwt_secret: Arc<str>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CandidateStore>,
        notifier: Arc<dyn WorkflowNotifier>,
        jwt_secret: &str,
        webhook_secret: Option<&str>,
    ) -> Self {
        let workflow = ApplicationWorkflow::new(store.clone(), notifier);
        let candidate_service = CandidateService::new(store, workflow);

        Self {
            candidate_service,
            jwt_secret: Arc::from(jwt_secret),
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }

    /// Wires the store and notifier described by `config`. Without a
    /// `DATABASE_URL` candidates live in process memory.
    pub async fn from_config(config: &Config) -> error::Result<Self> {
        let store: Arc<dyn CandidateStore> = match &config.database_url {
            Some(url) => {
                let pool = database::pool::create_pool(url).await?;
                database::pool::run_migrations(&pool).await?;
                Arc::new(PgCandidateStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, candidates are kept in memory only");
                Arc::new(MemoryCandidateStore::new())
            }
        };

        let notifier = N8nNotifier::new(
            config.n8n_webhook_url.clone(),
            config.webhook_secret.clone(),
            Duration::from_secs(config.notifier_timeout_secs),
        )?;

        Ok(Self::new(
            store,
            Arc::new(notifier),
            &config.jwt_secret,
            config.webhook_secret.as_deref(),
        ))
    }
}
