// Node Domain Model (content tree entries)

use super::error::{DomainError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node ID (opaque, unique within the tree)
pub type NodeId = String;

/// Node kind: containers hold children, leaves hold content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "TREE")]
    Folder,
    #[serde(rename = "BLOB")]
    File,
}

impl NodeKind {
    /// Parse the wire value (`TREE` / `BLOB`, case-insensitive)
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "TREE" => Ok(NodeKind::Folder),
            "BLOB" => Ok(NodeKind::File),
            _ => Err(DomainError::UnknownNodeKind(raw.to_string())),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Folder => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// One entry of the hierarchical content tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub name: String,
    pub mimetype: Option<String>,
    pub size: Option<u64>,
    pub creation: Option<DateTime<Utc>>,
    pub modification: Option<DateTime<Utc>>,
    pub root: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            kind,
            name: name.into(),
            mimetype: None,
            size: None,
            creation: None,
            modification: None,
            root: false,
        }
    }

    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Folder, name)
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::File, name)
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Flag this node as the tree root (no parent)
    pub fn as_root(mut self) -> Self {
        self.root = true;
        self.parent = None;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// One page of a container listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePage {
    pub values: Vec<Node>,
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_is_case_insensitive() {
        assert_eq!(NodeKind::parse("TREE").unwrap(), NodeKind::Folder);
        assert_eq!(NodeKind::parse("tree").unwrap(), NodeKind::Folder);
        assert_eq!(NodeKind::parse("Blob").unwrap(), NodeKind::File);
    }

    #[test]
    fn test_parse_unknown_kind_fails() {
        let err = NodeKind::parse("LINK").unwrap_err();
        assert_eq!(err, DomainError::UnknownNodeKind("LINK".to_string()));
    }

    #[test]
    fn test_as_root_drops_parent() {
        let node = Node::folder("r", "").with_parent("x").as_root();
        assert!(node.root);
        assert!(node.parent.is_none());
        assert!(node.is_folder());
    }
}
