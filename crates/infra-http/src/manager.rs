//! Manager API client (Process Service adapter)

use crate::auth::TokenProvider;
use crate::dto::decode_process_id;
use crate::error::Result as HttpResult;
use crate::transport::ApiTransport;
use async_trait::async_trait;
use mbyte_core::domain::{Application, CommandDescriptor, Process, ProcessId};
use mbyte_core::port::ProcessService;
use mbyte_core::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct ManagerClient {
    transport: ApiTransport,
}

impl ManagerClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<dyn TokenProvider>) -> HttpResult<Self> {
        Ok(Self {
            transport: ApiTransport::new(base_url, timeout, tokens)?,
        })
    }

    /// `GET /api/apps[?owner=...]`
    pub async fn list_apps(&self, owner: Option<&str>) -> Result<Vec<Application>> {
        let mut url = self.transport.url(&["api", "apps"])?;
        if let Some(owner) = owner {
            url.query_pairs_mut().append_pair("owner", owner);
        }
        Ok(self.transport.get_json(url).await?)
    }
}

#[async_trait]
impl ProcessService for ManagerClient {
    async fn start_command(&self, target: &str, command: &str) -> Result<ProcessId> {
        let url = self.transport.url(&["api", "apps", target, "procs"])?;
        let body = self.transport.post_form(url, &[("name", command)]).await?;
        let process_id = decode_process_id(&body)?;
        info!(target = %target, command = %command, process_id = %process_id, "Command submitted");
        Ok(process_id)
    }

    async fn get_process(&self, target: &str, process_id: &str) -> Result<Process> {
        let url = self
            .transport
            .url(&["api", "apps", target, "procs", process_id])?;
        Ok(self.transport.get_json(url).await?)
    }

    async fn list_processes(&self, target: &str, active_only: bool) -> Result<Vec<Process>> {
        let mut url = self.transport.url(&["api", "apps", target, "procs"])?;
        if active_only {
            url.query_pairs_mut().append_pair("active", "true");
        }
        Ok(self.transport.get_json(url).await?)
    }

    async fn list_commands(&self, target: &str) -> Result<Vec<CommandDescriptor>> {
        let url = self.transport.url(&["api", "apps", target, "commands"])?;
        Ok(self.transport.get_json(url).await?)
    }
}
