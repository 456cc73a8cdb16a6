// Domain Layer - Pure client-side entities

pub mod command;
pub mod error;
pub mod navigation;
pub mod node;
pub mod process;

// Re-exports
pub use command::{Application, CommandDescriptor, STORE_APP_TYPE};
pub use error::DomainError;
pub use navigation::{Breadcrumb, Crumb, ROOT_CRUMB_NAME};
pub use node::{Node, NodeId, NodeKind, NodePage};
pub use process::{is_terminal_status, Process, ProcessId, TERMINAL_STATUSES};
