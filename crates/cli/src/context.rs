//! Dependency wiring (composition root)

use anyhow::{Context as _, Result};
use mbyte_core::application::{NotifyingContentService, NotifyingProcessService};
use mbyte_core::port::Notifier;
use mbyte_infra_http::{ClientConfig, ManagerClient, StaticTokenProvider, StoreClient, TokenProvider};
use std::sync::Arc;
use tracing::info;

pub type Processes = NotifyingProcessService<ManagerClient>;
pub type Contents = NotifyingContentService<StoreClient>;

pub struct Context {
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
    notifier: Arc<dyn Notifier>,
}

impl Context {
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Self {
        let tokens = Arc::new(StaticTokenProvider::new(config.access_token.clone()));
        Self {
            config,
            tokens,
            notifier,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn manager(&self) -> Result<ManagerClient> {
        ManagerClient::new(
            &self.config.manager_base_url,
            self.config.request_timeout(),
            self.tokens.clone(),
        )
        .context("Invalid manager configuration")
    }

    /// Process Service whose failures are reported on the notification channel
    pub fn processes(&self) -> Result<Arc<Processes>> {
        Ok(Arc::new(NotifyingProcessService::new(
            self.manager()?,
            self.notifier.clone(),
        )))
    }

    /// Content Service of the user's store, with its base location
    pub async fn store(&self, owner: Option<&str>) -> Result<(String, Arc<Contents>)> {
        let apps = if self.config.store_base_url.is_some() {
            Vec::new()
        } else {
            self.manager()?
                .list_apps(owner)
                .await
                .context("Failed to list applications")?
        };

        let base = self.config.store_base_for(&apps).context(
            "No store available: set store_base_url, or stores_domain with a DOCKER_STORE application",
        )?;
        let store = StoreClient::new(&base, self.config.request_timeout(), self.tokens.clone())
            .context("Invalid store location")?;
        info!(base = %store.base_url(), "Using store");

        let base = store.base_url().to_string();
        Ok((
            base,
            Arc::new(NotifyingContentService::new(store, self.notifier.clone())),
        ))
    }
}
