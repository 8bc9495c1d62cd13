mod inbox_service;
mod notifier;

pub use inbox_service::InboxService;
pub use notifier::InboxNotifier;
