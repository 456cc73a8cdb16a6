// Application Layer - Client state machines and shared utilities

pub mod cancel;
pub mod command_runner;
pub mod dedup;
pub mod navigator;
pub mod notifying;

// Re-exports
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use command_runner::{CommandExecution, CommandPhase, CommandRunner};
pub use navigator::{ContentNavigator, Location, NavigationState, ResolveOutcome};
pub use notifying::{NotifyingContentService, NotifyingProcessService};
