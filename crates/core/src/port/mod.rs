// Port Layer - Interfaces for external collaborators

pub mod content_service;
pub mod notifier;
pub mod process_service;

// Re-exports
pub use content_service::{ContentService, ContentStream, DEFAULT_PAGE_SIZE};
pub use notifier::{notification_channel, ChannelNotifier, Notification, Notifier};
pub use process_service::ProcessService;
