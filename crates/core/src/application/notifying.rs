// Notifying decorators
// Publish every remote failure to the notification channel, then re-raise it unchanged.
// NotFound is an expected outcome and stays silent.

use crate::domain::{CommandDescriptor, Node, NodePage, Process, ProcessId};
use crate::error::Result;
use crate::port::{ContentService, ContentStream, Notifier, ProcessService};
use async_trait::async_trait;
use std::sync::Arc;

fn report<T>(notifier: &dyn Notifier, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if !e.is_not_found() {
            notifier.publish(&e.to_string());
        }
    }
    result
}

/// Process Service wrapper that reports failures to the user
pub struct NotifyingProcessService<S> {
    inner: S,
    notifier: Arc<dyn Notifier>,
}

impl<S: ProcessService> NotifyingProcessService<S> {
    pub fn new(inner: S, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ProcessService> ProcessService for NotifyingProcessService<S> {
    async fn start_command(&self, target: &str, command: &str) -> Result<ProcessId> {
        report(
            self.notifier.as_ref(),
            self.inner.start_command(target, command).await,
        )
    }

    async fn get_process(&self, target: &str, process_id: &str) -> Result<Process> {
        report(
            self.notifier.as_ref(),
            self.inner.get_process(target, process_id).await,
        )
    }

    async fn list_processes(&self, target: &str, active_only: bool) -> Result<Vec<Process>> {
        report(
            self.notifier.as_ref(),
            self.inner.list_processes(target, active_only).await,
        )
    }

    async fn list_commands(&self, target: &str) -> Result<Vec<CommandDescriptor>> {
        report(self.notifier.as_ref(), self.inner.list_commands(target).await)
    }
}

/// Content Service wrapper that reports failures to the user
pub struct NotifyingContentService<S> {
    inner: S,
    notifier: Arc<dyn Notifier>,
}

impl<S: ContentService> NotifyingContentService<S> {
    pub fn new(inner: S, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ContentService> ContentService for NotifyingContentService<S> {
    async fn get_root(&self) -> Result<Node> {
        report(self.notifier.as_ref(), self.inner.get_root().await)
    }

    async fn get_node(&self, id: &str) -> Result<Node> {
        report(self.notifier.as_ref(), self.inner.get_node(id).await)
    }

    async fn list_children(&self, container_id: &str, limit: u32, offset: u32) -> Result<NodePage> {
        report(
            self.notifier.as_ref(),
            self.inner.list_children(container_id, limit, offset).await,
        )
    }

    async fn get_path(&self, id: &str) -> Result<Vec<Node>> {
        report(self.notifier.as_ref(), self.inner.get_path(id).await)
    }

    async fn get_content(&self, id: &str, as_attachment: bool) -> Result<ContentStream> {
        report(
            self.notifier.as_ref(),
            self.inner.get_content(id, as_attachment).await,
        )
    }
}
