// Resolution of a positional reference into listing, breadcrumb & selection

use super::state::Resolution;
use crate::domain::{Breadcrumb, Node};
use crate::error::{AppError, Result};
use crate::port::ContentService;
use tracing::debug;

/// Resolve `reference` (absent = root). Never fails: errors degrade to the root fallback.
pub(crate) async fn execute(
    content: &dyn ContentService,
    reference: Option<&str>,
    page_size: u32,
) -> Resolution {
    let Some(id) = reference else {
        return resolve_root(content, page_size).await;
    };

    match resolve_reference(content, id, page_size).await {
        Ok(resolution) => resolution,
        Err(e) => {
            debug!(node_id = %id, error = %e, "Falling back to root listing");
            fallback(content, page_size).await
        }
    }
}

/// Root listing without breadcrumb or selection (the root path is not fetched)
async fn fallback(content: &dyn ContentService, page_size: u32) -> Resolution {
    let children = match root_listing(content, page_size).await {
        Ok((_, children)) => children,
        Err(e) => {
            debug!(error = %e, "Root listing failed");
            Vec::new()
        }
    };
    Resolution {
        children,
        breadcrumb: Some(Breadcrumb::empty()),
        selection: None,
    }
}

/// Root listing with the root breadcrumb
///
/// Root or root listing failure clears the listing and keeps the breadcrumb.
/// Root path failure keeps the listing and hides the breadcrumb.
async fn resolve_root(content: &dyn ContentService, page_size: u32) -> Resolution {
    let (root, children) = match root_listing(content, page_size).await {
        Ok(listed) => listed,
        Err(e) => {
            debug!(error = %e, "Root listing failed");
            return Resolution::default();
        }
    };

    let breadcrumb = match content.get_path(&root.id).await {
        Ok(path) => Breadcrumb::from_path(&path),
        Err(e) => {
            debug!(error = %e, "Root path failed");
            Breadcrumb::empty()
        }
    };

    Resolution {
        children,
        breadcrumb: Some(breadcrumb),
        selection: None,
    }
}

/// Container: its own listing. Leaf: the root listing with the leaf selected.
async fn resolve_reference(
    content: &dyn ContentService,
    id: &str,
    page_size: u32,
) -> Result<Resolution> {
    let node = content.get_node(id).await.map_err(step("node"))?;

    let (children, selection) = if node.is_folder() {
        (first_page(content, &node.id, page_size).await?, None)
    } else {
        let (_, children) = root_listing(content, page_size).await?;
        (children, Some(node.clone()))
    };

    let path = content.get_path(&node.id).await.map_err(step("path"))?;

    Ok(Resolution {
        children,
        breadcrumb: Some(Breadcrumb::from_path(&path)),
        selection,
    })
}

async fn root_listing(content: &dyn ContentService, page_size: u32) -> Result<(Node, Vec<Node>)> {
    let root = content.get_root().await.map_err(step("root"))?;
    let children = first_page(content, &root.id, page_size).await?;
    Ok((root, children))
}

async fn first_page(content: &dyn ContentService, id: &str, page_size: u32) -> Result<Vec<Node>> {
    let page = content
        .list_children(id, page_size, 0)
        .await
        .map_err(step("children"))?;
    Ok(page.values)
}

fn step(name: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |e| AppError::Resolution(format!("{} step failed: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Crumb;
    use crate::port::content_service::mocks::{ContentCall, ContentOp, InMemoryContentService, ROOT_ID};
    use crate::port::DEFAULT_PAGE_SIZE;

    fn tree() -> InMemoryContentService {
        let content = InMemoryContentService::new();
        content
            .add_folder(ROOT_ID, "d1", "docs")
            .add_file(ROOT_ID, "f0", "readme.md", b"# readme")
            .add_folder("d1", "d2", "2025")
            .add_file("d2", "f1", "report.pdf", b"%PDF");
        content
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_root_resolution() {
        let content = tree();

        let resolution = execute(&content, None, DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["d1", "f0"]);
        assert_eq!(resolution.breadcrumb, Some(Breadcrumb::root()));
        assert!(resolution.selection.is_none());
        assert_eq!(
            content.calls(),
            vec![
                ContentCall::Root,
                ContentCall::Children {
                    id: ROOT_ID.to_string(),
                    limit: 200,
                    offset: 0
                },
                ContentCall::Path(ROOT_ID.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_container_resolution() {
        let content = tree();

        let resolution = execute(&content, Some("d2"), DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["f1"]);
        let breadcrumb = resolution.breadcrumb.unwrap();
        assert_eq!(
            breadcrumb.entries(),
            &[
                Crumb::root(),
                Crumb {
                    id: Some("d1".to_string()),
                    name: "docs".to_string()
                },
                Crumb {
                    id: Some("d2".to_string()),
                    name: "2025".to_string()
                },
            ]
        );
        assert!(resolution.selection.is_none());
    }

    #[tokio::test]
    async fn test_leaf_resolution_selects_leaf_over_root_listing() {
        let content = tree();

        let resolution = execute(&content, Some("f1"), DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["d1", "f0"]);
        assert_eq!(resolution.breadcrumb.unwrap().to_string(), "/docs/2025/report.pdf");
        assert_eq!(resolution.selection.map(|node| node.id), Some("f1".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_node_falls_back_to_root() {
        let content = tree();

        let resolution = execute(&content, Some("missing"), DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["d1", "f0"]);
        assert_eq!(resolution.breadcrumb, Some(Breadcrumb::empty()));
        assert!(resolution.selection.is_none());
        assert_eq!(
            content.calls(),
            vec![
                ContentCall::Node("missing".to_string()),
                ContentCall::Root,
                ContentCall::Children {
                    id: ROOT_ID.to_string(),
                    limit: 200,
                    offset: 0
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_fallback_with_failing_root_clears_listing() {
        let content = tree();
        content.fail(ContentOp::Root, ROOT_ID, AppError::remote("HTTP 503: down"));

        let resolution = execute(&content, Some("missing"), DEFAULT_PAGE_SIZE).await;

        assert!(resolution.children.is_empty());
        assert_eq!(resolution.breadcrumb, Some(Breadcrumb::empty()));
        assert!(resolution.selection.is_none());
    }

    #[tokio::test]
    async fn test_path_failure_falls_back_to_root() {
        let content = tree();
        content.fail(ContentOp::Path, "d2", AppError::remote("HTTP 500: boom"));

        let resolution = execute(&content, Some("d2"), DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["d1", "f0"]);
        assert_eq!(resolution.breadcrumb, Some(Breadcrumb::empty()));
    }

    #[tokio::test]
    async fn test_root_failure_clears_listing_and_keeps_breadcrumb() {
        let content = tree();
        content.fail(ContentOp::Root, ROOT_ID, AppError::remote("HTTP 503: down"));

        let resolution = execute(&content, None, DEFAULT_PAGE_SIZE).await;

        assert_eq!(resolution, Resolution::default());
    }

    #[tokio::test]
    async fn test_root_path_failure_keeps_listing() {
        let content = tree();
        content.fail(ContentOp::Path, ROOT_ID, AppError::remote("HTTP 500: boom"));

        let resolution = execute(&content, None, DEFAULT_PAGE_SIZE).await;

        assert_eq!(ids(&resolution.children), vec!["d1", "f0"]);
        assert_eq!(resolution.breadcrumb, Some(Breadcrumb::empty()));
    }

    #[tokio::test]
    async fn test_listing_uses_page_size() {
        let content = tree();

        execute(&content, Some("d1"), 10).await;

        assert!(content.calls().contains(&ContentCall::Children {
            id: "d1".to_string(),
            limit: 10,
            offset: 0
        }));
    }
}
