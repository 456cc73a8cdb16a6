// Content Service Port (store API)

use crate::domain::{Node, NodePage};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Page size used for every container listing
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Chunked content bytes
pub type ContentStream = BoxStream<'static, Result<Vec<u8>>>;

/// Remote hierarchical content tree
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Get the root container
    async fn get_root(&self) -> Result<Node>;

    /// Get a node by id
    ///
    /// # Errors
    /// - `AppError::NotFound` if no node has this id
    async fn get_node(&self, id: &str) -> Result<Node>;

    /// List one page of a container's children
    async fn list_children(&self, container_id: &str, limit: u32, offset: u32)
        -> Result<NodePage>;

    /// Ancestor path of a node: root-exclusive, root-to-node order, ending with the node
    async fn get_path(&self, id: &str) -> Result<Vec<Node>>;

    /// Stream the content bytes of a leaf
    async fn get_content(&self, id: &str, as_attachment: bool) -> Result<ContentStream>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Id of the root node of every in-memory tree
    pub const ROOT_ID: &str = "root";

    /// Content operation (for failure injection)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ContentOp {
        Root,
        Node,
        Children,
        Path,
        Content,
    }

    /// Recorded call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ContentCall {
        Root,
        Node(String),
        Children { id: String, limit: u32, offset: u32 },
        Path(String),
        Content { id: String, as_attachment: bool },
    }

    /// In-memory content tree for testing
    pub struct InMemoryContentService {
        nodes: Mutex<Vec<Node>>,
        contents: Mutex<HashMap<String, Vec<u8>>>,
        failures: Mutex<HashMap<(ContentOp, String), AppError>>,
        delays: Mutex<HashMap<String, Duration>>,
        calls: Mutex<Vec<ContentCall>>,
    }

    impl Default for InMemoryContentService {
        fn default() -> Self {
            Self::new()
        }
    }

    impl InMemoryContentService {
        /// Tree with a single, empty root
        pub fn new() -> Self {
            Self {
                nodes: Mutex::new(vec![Node::folder(ROOT_ID, "").as_root()]),
                contents: Mutex::new(HashMap::new()),
                failures: Mutex::new(HashMap::new()),
                delays: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn add_folder(&self, parent: &str, id: &str, name: &str) -> &Self {
            self.nodes
                .lock()
                .unwrap()
                .push(Node::folder(id, name).with_parent(parent));
            self
        }

        pub fn add_file(&self, parent: &str, id: &str, name: &str, content: &[u8]) -> &Self {
            let mut node = Node::file(id, name).with_parent(parent);
            node.size = Some(content.len() as u64);
            self.nodes.lock().unwrap().push(node);
            self.contents
                .lock()
                .unwrap()
                .insert(id.to_string(), content.to_vec());
            self
        }

        /// Make `op` fail for `id` (use `ROOT_ID` with `ContentOp::Root`)
        pub fn fail(&self, op: ContentOp, id: &str, err: AppError) -> &Self {
            self.failures
                .lock()
                .unwrap()
                .insert((op, id.to_string()), err);
            self
        }

        /// Delay `get_node` for `id`
        pub fn delay_node(&self, id: &str, delay: Duration) -> &Self {
            self.delays.lock().unwrap().insert(id.to_string(), delay);
            self
        }

        pub fn calls(&self) -> Vec<ContentCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: ContentCall) {
            self.calls.lock().unwrap().push(call);
        }

        fn check(&self, op: ContentOp, id: &str) -> Result<()> {
            match self.failures.lock().unwrap().get(&(op, id.to_string())) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn find(&self, id: &str) -> Result<Node> {
            self.nodes
                .lock()
                .unwrap()
                .iter()
                .find(|node| node.id == id)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("node {}", id)))
        }
    }

    #[async_trait]
    impl ContentService for InMemoryContentService {
        async fn get_root(&self) -> Result<Node> {
            self.record(ContentCall::Root);
            self.check(ContentOp::Root, ROOT_ID)?;
            self.find(ROOT_ID)
        }

        async fn get_node(&self, id: &str) -> Result<Node> {
            self.record(ContentCall::Node(id.to_string()));
            let delay = self.delays.lock().unwrap().get(id).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.check(ContentOp::Node, id)?;
            self.find(id)
        }

        async fn list_children(
            &self,
            container_id: &str,
            limit: u32,
            offset: u32,
        ) -> Result<NodePage> {
            self.record(ContentCall::Children {
                id: container_id.to_string(),
                limit,
                offset,
            });
            self.check(ContentOp::Children, container_id)?;
            let container = self.find(container_id)?;
            let children: Vec<Node> = self
                .nodes
                .lock()
                .unwrap()
                .iter()
                .filter(|node| node.parent.as_deref() == Some(container.id.as_str()))
                .cloned()
                .collect();
            let total = children.len() as u64;
            Ok(NodePage {
                values: children
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect(),
                total: Some(total),
            })
        }

        async fn get_path(&self, id: &str) -> Result<Vec<Node>> {
            self.record(ContentCall::Path(id.to_string()));
            self.check(ContentOp::Path, id)?;
            let mut path = Vec::new();
            let mut current = self.find(id)?;
            while !current.root {
                let parent = current.parent.clone();
                path.push(current);
                match parent {
                    Some(parent) => current = self.find(&parent)?,
                    None => break,
                }
            }
            path.reverse();
            Ok(path)
        }

        async fn get_content(&self, id: &str, as_attachment: bool) -> Result<ContentStream> {
            self.record(ContentCall::Content {
                id: id.to_string(),
                as_attachment,
            });
            self.check(ContentOp::Content, id)?;
            let bytes = self
                .contents
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("content {}", id)))?;
            let chunks: Vec<Result<Vec<u8>>> =
                bytes.chunks(4).map(|chunk| Ok(chunk.to_vec())).collect();
            Ok(futures::stream::iter(chunks).boxed())
        }
    }
}
