// Breadcrumb trail (root-first)

use super::node::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Display name of the root entry
pub const ROOT_CRUMB_NAME: &str = "/";

/// One breadcrumb entry. The root entry carries no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub id: Option<NodeId>,
    pub name: String,
}

impl Crumb {
    pub fn root() -> Self {
        Self {
            id: None,
            name: ROOT_CRUMB_NAME.to_string(),
        }
    }
}

/// Root-to-current trail of named positions
///
/// Either empty (hidden) or starting with the root entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb(Vec<Crumb>);

impl Breadcrumb {
    /// Hidden breadcrumb (used when a location could not be resolved)
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Breadcrumb pointing at the root only
    pub fn root() -> Self {
        Self(vec![Crumb::root()])
    }

    /// Build `/` followed by the ancestor path (root-exclusive, root-to-node order)
    pub fn from_path(path: &[Node]) -> Self {
        let mut crumbs = Vec::with_capacity(path.len() + 1);
        crumbs.push(Crumb::root());
        crumbs.extend(path.iter().map(|node| Crumb {
            id: Some(node.id.clone()),
            name: node.name.clone(),
        }));
        Self(crumbs)
    }

    pub fn entries(&self) -> &[Crumb] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Crumb> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .0
            .iter()
            .skip(1)
            .map(|crumb| crumb.name.as_str())
            .collect();
        match self.0.first() {
            None => Ok(()),
            Some(_) => write!(f, "/{}", names.join("/")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_starts_with_root() {
        let path = vec![
            Node::folder("a", "docs"),
            Node::folder("b", "2025").with_parent("a"),
        ];
        let crumbs = Breadcrumb::from_path(&path);

        assert_eq!(crumbs.len(), 3);
        assert_eq!(crumbs.get(0), Some(&Crumb::root()));
        assert_eq!(crumbs.get(2).unwrap().id.as_deref(), Some("b"));
        assert_eq!(crumbs.to_string(), "/docs/2025");
    }

    #[test]
    fn test_from_empty_path_is_root() {
        assert_eq!(Breadcrumb::from_path(&[]), Breadcrumb::root());
        assert_eq!(Breadcrumb::root().to_string(), "/");
        assert_eq!(Breadcrumb::empty().to_string(), "");
    }
}
