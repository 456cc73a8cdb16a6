// Navigation state & locations

use crate::application::dedup::{same_listing, same_selection, DedupKey};
use crate::domain::{Breadcrumb, Node, NodeId};
use serde::Serialize;

/// A (base location, positional reference) pair
///
/// `reference` absent = root of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub base: String,
    pub reference: Option<NodeId>,
}

impl Location {
    pub fn root(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            reference: None,
        }
    }

    pub fn node(base: impl Into<String>, id: impl Into<NodeId>) -> Self {
        Self {
            base: base.into(),
            reference: Some(id.into()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.reference.is_none()
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::for_location(&self.base, self.reference.as_deref())
    }
}

/// What the UI renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationState {
    pub breadcrumb: Breadcrumb,
    pub children: Vec<Node>,
    pub selection: Option<Node>,
    /// True while a resolution is in flight
    pub loading: bool,
}

/// Result of one resolution, computed entirely before it is committed
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Resolution {
    pub children: Vec<Node>,
    /// None = keep the current breadcrumb
    pub breadcrumb: Option<Breadcrumb>,
    pub selection: Option<Node>,
}

impl NavigationState {
    /// Commit a resolution, replacing only what structurally changed
    ///
    /// Returns true if anything was modified.
    pub(crate) fn apply(&mut self, resolution: Resolution) -> bool {
        let mut changed = false;

        if !same_listing(&self.children, &resolution.children) {
            self.children = resolution.children;
            changed = true;
        }
        if let Some(breadcrumb) = resolution.breadcrumb {
            if self.breadcrumb != breadcrumb {
                self.breadcrumb = breadcrumb;
                changed = true;
            }
        }
        if !same_selection(self.selection.as_ref(), resolution.selection.as_ref()) {
            self.selection = resolution.selection;
            changed = true;
        }
        if self.loading {
            self.loading = false;
            changed = true;
        }

        changed
    }

    /// Replace the selection if it points at another node
    pub(crate) fn select(&mut self, node: Option<Node>) -> bool {
        if same_selection(self.selection.as_ref(), node.as_ref()) {
            return false;
        }
        self.selection = node;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<Node> {
        vec![Node::folder("d1", "docs"), Node::file("f0", "readme.md")]
    }

    #[test]
    fn test_location_keys() {
        assert!(Location::root("https://s/").is_root());
        assert_eq!(Location::node("https://s/", "n1").dedup_key().as_str(), "https://s/|n1");
        assert_ne!(
            Location::root("https://s/").dedup_key(),
            Location::node("https://s/", "n1").dedup_key()
        );
    }

    #[test]
    fn test_apply_replaces_changed_parts() {
        let mut state = NavigationState {
            loading: true,
            ..Default::default()
        };
        let changed = state.apply(Resolution {
            children: listing(),
            breadcrumb: Some(Breadcrumb::root()),
            selection: None,
        });

        assert!(changed);
        assert_eq!(state.children.len(), 2);
        assert_eq!(state.breadcrumb, Breadcrumb::root());
        assert!(!state.loading);
    }

    #[test]
    fn test_apply_keeps_structurally_equal_listing() {
        let mut state = NavigationState {
            children: listing(),
            breadcrumb: Breadcrumb::root(),
            ..Default::default()
        };
        let mut renamed = listing();
        renamed[0].name = "Documents".to_string();

        let changed = state.apply(Resolution {
            children: renamed,
            breadcrumb: Some(Breadcrumb::root()),
            selection: None,
        });

        assert!(!changed);
        assert_eq!(state.children[0].name, "docs");
    }

    #[test]
    fn test_apply_without_breadcrumb_keeps_current() {
        let path = vec![Node::folder("d1", "docs")];
        let mut state = NavigationState {
            children: listing(),
            breadcrumb: Breadcrumb::from_path(&path),
            selection: Some(Node::file("f0", "readme.md")),
            loading: true,
        };

        assert!(state.apply(Resolution::default()));
        assert!(state.children.is_empty());
        assert!(state.selection.is_none());
        assert_eq!(state.breadcrumb, Breadcrumb::from_path(&path));
    }

    #[test]
    fn test_select_compares_ids() {
        let mut state = NavigationState::default();
        let file = Node::file("f0", "readme.md");
        assert!(state.select(Some(file.clone())));
        assert!(!state.select(Some(file)));
        assert!(state.select(None));
    }
}
