//! Store API client (Content Service adapter)

use crate::auth::TokenProvider;
use crate::dto::{decode_nodes, NodeDto, NodePageDto};
use crate::error::{HttpError, Result as HttpResult};
use crate::transport::ApiTransport;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mbyte_core::domain::{Node, NodePage};
use mbyte_core::port::{ContentService, ContentStream};
use mbyte_core::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;

pub struct StoreClient {
    transport: ApiTransport,
}

impl StoreClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<dyn TokenProvider>) -> HttpResult<Self> {
        Ok(Self {
            transport: ApiTransport::new(base_url, timeout, tokens)?,
        })
    }

    /// Base location, used as the navigation dedup dimension
    pub fn base_url(&self) -> &str {
        self.transport.base_url().as_str()
    }

    async fn node(&self, segments: &[&str]) -> Result<Node> {
        let url = self.transport.url(segments)?;
        let dto: NodeDto = self.transport.get_json(url).await?;
        Ok(Node::try_from(dto)?)
    }
}

#[async_trait]
impl ContentService for StoreClient {
    async fn get_root(&self) -> Result<Node> {
        self.node(&["api", "nodes"]).await
    }

    async fn get_node(&self, id: &str) -> Result<Node> {
        self.node(&["api", "nodes", id]).await
    }

    async fn list_children(&self, container_id: &str, limit: u32, offset: u32) -> Result<NodePage> {
        let mut url = self
            .transport
            .url(&["api", "nodes", container_id, "children"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        let dto: NodePageDto = self.transport.get_json(url).await?;
        Ok(NodePage::try_from(dto)?)
    }

    async fn get_path(&self, id: &str) -> Result<Vec<Node>> {
        let url = self.transport.url(&["api", "nodes", id, "path"])?;
        let dtos: Vec<NodeDto> = self.transport.get_json(url).await?;
        Ok(decode_nodes(dtos)?)
    }

    async fn get_content(&self, id: &str, as_attachment: bool) -> Result<ContentStream> {
        let mut url = self.transport.url(&["api", "nodes", id, "content"])?;
        if as_attachment {
            url.query_pairs_mut().append_pair("download", "true");
        }
        let response = self.transport.get_stream(url).await?;
        let stream = response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(|e| AppError::from(HttpError::from(e)));
        Ok(stream.boxed())
    }
}
