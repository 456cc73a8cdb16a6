//! ContentNavigator - Resolves positional references into listings & breadcrumbs
//!
//! - Repeated (base, reference) pairs are resolved at most once
//! - Only the latest resolution commits; superseded results are dropped
//! - Commits replace only the parts that structurally changed (no flicker)
//! - Failures never surface: they degrade to the root listing and are logged

mod resolve;
mod state;

pub use state::{Location, NavigationState};

use crate::application::cancel::{cancel_pair, CancelHandle, CancelToken};
use crate::application::dedup::{DedupKey, KeyGuard};
use crate::domain::Node;
use crate::port::{ContentService, DEFAULT_PAGE_SIZE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

/// What happened to a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Nothing to do (same pair as last time, no base location, or disposed)
    Skipped,
    /// Resolution finished and its result was committed
    Committed,
    /// A newer navigation started before this one finished; result dropped
    Superseded,
}

/// Browsing engine over a remote content tree
pub struct ContentNavigator {
    content: Arc<dyn ContentService>,
    page_size: u32,
    state: watch::Sender<NavigationState>,
    last_key: KeyGuard,
    inflight: Mutex<Option<CancelHandle>>,
    base: Mutex<Option<String>>,
    disposed: AtomicBool,
}

impl ContentNavigator {
    pub fn new(content: Arc<dyn ContentService>) -> Self {
        Self::with_page_size(content, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(content: Arc<dyn ContentService>, page_size: u32) -> Self {
        let (state, _) = watch::channel(NavigationState::default());
        Self {
            content,
            page_size,
            state,
            last_key: KeyGuard::new(),
            inflight: Mutex::new(None),
            base: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Resolve `location` and commit the result unless a newer navigation superseded it
    pub async fn navigate_to(&self, location: &Location) -> ResolveOutcome {
        if self.is_disposed() {
            return ResolveOutcome::Skipped;
        }
        if location.base.is_empty() {
            debug!("No content base location, resolution skipped");
            return ResolveOutcome::Skipped;
        }
        let key = location.dedup_key();
        let Some(token) = self.begin(location, key.clone()) else {
            debug!(key = %key.as_str(), "Location unchanged, resolution skipped");
            return ResolveOutcome::Skipped;
        };

        debug!(key = %key.as_str(), "Resolving location");
        let resolution = resolve::execute(
            self.content.as_ref(),
            location.reference.as_deref(),
            self.page_size,
        )
        .await;

        let mut superseded = false;
        let changed = self.state.send_if_modified(|state| {
            if token.is_cancelled() {
                superseded = true;
                return false;
            }
            state.apply(resolution)
        });

        if superseded {
            debug!(key = %key.as_str(), "Resolution superseded, result dropped");
            return ResolveOutcome::Superseded;
        }
        info!(key = %key.as_str(), changed, "Location resolved");
        ResolveOutcome::Committed
    }

    /// Location of the current root
    pub fn root_location(&self) -> Option<Location> {
        lock(&self.base).clone().map(Location::root)
    }

    /// Open a node from the listing
    ///
    /// Folder: clears the selection and returns the location to navigate to.
    /// File: selects it and returns None.
    pub fn open(&self, node: &Node) -> Option<Location> {
        if self.is_disposed() {
            return None;
        }
        if node.is_folder() {
            self.state.send_if_modified(|state| state.select(None));
            lock(&self.base)
                .clone()
                .map(|base| Location::node(base, node.id.clone()))
        } else {
            self.select(node.clone());
            None
        }
    }

    /// Inspect a node without navigating
    pub fn select(&self, node: Node) {
        if self.is_disposed() {
            return;
        }
        self.state.send_if_modified(|state| state.select(Some(node)));
    }

    /// Location of one breadcrumb entry (entry 0 is the root)
    pub fn location_for_crumb(&self, index: usize) -> Option<Location> {
        let base = lock(&self.base).clone()?;
        let state = self.state.borrow();
        let crumb = state.breadcrumb.get(index)?;
        Some(match &crumb.id {
            None => Location::root(base),
            Some(id) => Location::node(base, id.clone()),
        })
    }

    /// Drop the in-flight resolution and freeze the state. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(inflight) = lock(&self.inflight).take() {
            self.state.send_if_modified(|_| {
                inflight.cancel();
                false
            });
        }
        debug!("Content navigator disposed");
    }

    /// Claim `key`, supersede the previous resolution and mark the state as loading
    ///
    /// The claim and the in-flight swap happen under the in-flight lock, so the latest
    /// claimed key is always the one whose resolution may commit.
    fn begin(&self, location: &Location, key: DedupKey) -> Option<CancelToken> {
        let mut inflight = lock(&self.inflight);
        if !self.last_key.claim(key) {
            return None;
        }
        *lock(&self.base) = Some(location.base.clone());

        let (handle, token) = cancel_pair();
        let previous = inflight.replace(handle);
        self.state.send_if_modified(|state| {
            if let Some(previous) = &previous {
                previous.cancel();
            }
            if state.loading {
                return false;
            }
            state.loading = true;
            true
        });
        Some(token)
    }
}

impl Drop for ContentNavigator {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
